use crate::{RunOutcome, SessionId, SessionPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsoleViewModel {
    pub phase: SessionPhase,
    pub loading: bool,
    /// Credential form is the active surface.
    pub show_form: bool,
    /// Stop control is actionable right now.
    pub can_stop: bool,
    /// Log entry currently revealed by the display cursor.
    pub visible_line: Option<String>,
    pub log_len: usize,
    pub runs: Vec<RunRowView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRowView {
    pub session_id: SessionId,
    pub outcome: RunOutcome,
    pub lines: usize,
}
