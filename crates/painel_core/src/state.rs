use crate::protocol::LINE_STARTING;
use crate::view_model::{ConsoleViewModel, RunRowView};

pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Credential form visible; no live socket.
    #[default]
    FormEntry,
    /// Socket open, worker running server-side.
    Running,
    /// Worker asked for a one-time code.
    AwaitingTwoFactor,
    /// Run ended; waiting out the return-to-form delay.
    Stopped,
}

/// How one run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Stopped,
    WrongPassword,
    ConnectionLost,
    /// Stop request never reached the endpoint; socket was force-closed.
    Aborted,
}

/// Record of one finished run, kept for the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRunSnapshot {
    pub session_id: SessionId,
    pub outcome: RunOutcome,
    /// Log length at the moment the run ended.
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: SessionPhase,
    loading: bool,
    log: Vec<String>,
    cursor: usize,
    session_id: Option<SessionId>,
    stop_in_flight: bool,
    completed_runs: Vec<CompletedRunSnapshot>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn view(&self) -> ConsoleViewModel {
        let running = matches!(
            self.phase,
            SessionPhase::Running | SessionPhase::AwaitingTwoFactor
        );
        ConsoleViewModel {
            phase: self.phase,
            loading: self.loading,
            show_form: self.phase == SessionPhase::FormEntry,
            can_stop: running && !self.loading && !self.stop_in_flight,
            visible_line: self.log.get(self.cursor).cloned(),
            log_len: self.log.len(),
            runs: self
                .completed_runs
                .iter()
                .map(|run| RunRowView {
                    session_id: run.session_id.clone(),
                    outcome: run.outcome,
                    lines: run.lines,
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn completed_runs_snapshot(&self) -> Vec<CompletedRunSnapshot> {
        self.completed_runs.clone()
    }

    pub(crate) fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub(crate) fn stop_in_flight(&self) -> bool {
        self.stop_in_flight
    }

    pub(crate) fn set_stop_in_flight(&mut self, in_flight: bool) {
        self.stop_in_flight = in_flight;
    }

    /// Reset the log to the single synthetic starting entry and go live.
    pub(crate) fn start_run(&mut self, session_id: SessionId) {
        self.phase = SessionPhase::Running;
        self.loading = true;
        self.log = vec![LINE_STARTING.to_owned()];
        self.cursor = 0;
        self.session_id = Some(session_id);
        self.stop_in_flight = false;
        self.dirty = true;
    }

    pub(crate) fn push_line(&mut self, text: String) {
        self.log.push(text);
        self.dirty = true;
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.dirty = true;
        }
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    /// Advance the reveal cursor by one entry if any remain.
    pub(crate) fn advance_cursor(&mut self) {
        if self.cursor + 1 < self.log.len() {
            self.cursor += 1;
            self.dirty = true;
        }
    }

    /// Close out the live run, moving its identity into the history.
    pub(crate) fn record_run(&mut self, outcome: RunOutcome) {
        if let Some(session_id) = self.session_id.take() {
            self.completed_runs.push(CompletedRunSnapshot {
                session_id,
                outcome,
                lines: self.log.len(),
            });
            self.dirty = true;
        }
    }

    pub(crate) fn restore_completed_runs(&mut self, runs: Vec<CompletedRunSnapshot>) {
        self.completed_runs = runs;
        self.dirty = true;
    }
}
