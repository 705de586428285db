//! Painel core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod protocol;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, RETURN_TO_FORM_DELAY, REVEAL_INTERVAL};
pub use msg::{Msg, StopOutcome};
pub use protocol::{
    classify, ClassifiedLine, LineKind, ENVELOPE_VERSION, LINE_CONNECTION_LOST,
    LINE_CONNECT_FAILED, LINE_STARTING, LINE_STOPPED, LINE_STOP_FAILED, LINE_VALIDATING,
    SENTINEL_AUTH_SUCCESS, SENTINEL_STOPPED, SENTINEL_TWO_FACTOR, SENTINEL_WRONG_PASSWORD,
};
pub use state::{AppState, CompletedRunSnapshot, RunOutcome, SessionId, SessionPhase};
pub use update::update;
pub use view_model::{ConsoleViewModel, RunRowView};
