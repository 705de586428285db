use std::fmt;

/// Event emitted by the engine toward the dispatch loop.
///
/// Every event carries the id of the session it belongs to, so the shell can
/// discard leftovers from a session that was already torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Socket established; credentials already sent.
    SocketOpened { session_id: String },
    /// One raw status line from the worker.
    Line { session_id: String, text: String },
    /// The socket could not be opened.
    ConnectFailed { session_id: String, detail: String },
    /// Socket gone; `clean` distinguishes a close frame from an error.
    SocketClosed { session_id: String, clean: bool },
    /// Answer (or lack of one) from the control endpoint.
    StopResult {
        session_id: String,
        result: Result<(), ControlFailure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFailure {
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16, detail: String },
    /// The request never reached the endpoint.
    Unreachable { detail: String },
}

impl fmt::Display for ControlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlFailure::Rejected { status, detail } => {
                write!(f, "stop rejected with status {status}: {detail}")
            }
            ControlFailure::Unreachable { detail } => {
                write!(f, "control endpoint unreachable: {detail}")
            }
        }
    }
}
