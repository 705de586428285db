use std::time::Duration;

/// How often the display cursor advances through the message log.
pub const REVEAL_INTERVAL: Duration = Duration::from_secs(2);
/// How long a stopped session stays on screen before the form returns.
pub const RETURN_TO_FORM_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the worker socket and send the credential payload on open.
    OpenSocket {
        session_id: crate::SessionId,
        username: String,
        password: String,
    },
    /// Send a one-time code over the already open socket.
    SendTwoFactor {
        session_id: crate::SessionId,
        code: String,
    },
    /// Ask the control endpoint to interrupt the run.
    RequestStop { session_id: crate::SessionId },
    /// Close and discard the socket handle.
    CloseSocket,
    /// Return to the form after the given delay.
    ScheduleReturnToForm { delay: Duration },
}
