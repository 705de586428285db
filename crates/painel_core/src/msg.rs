/// Outcome of one stop request against the control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// 2xx from the control endpoint; the worker confirmed the interrupt.
    Confirmed,
    /// Non-2xx; the body text is kept for diagnostics.
    Rejected { status: u16, detail: String },
    /// The request never reached the endpoint (transport failure or timeout).
    Unreachable { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the credential form. The shell mints the session id.
    FormSubmitted {
        username: String,
        password: String,
        session_id: crate::SessionId,
    },
    /// User submitted a one-time code for the two-factor challenge.
    TwoFactorSubmitted { code: String },
    /// User clicked Stop.
    StopClicked,
    /// Control endpoint answered (or failed to answer) a stop request.
    StopResult(StopOutcome),
    /// One raw status line arrived over the socket.
    LineReceived(String),
    /// The socket closed; `clean` distinguishes a close frame from an error.
    SocketClosed { clean: bool },
    /// The socket could not be opened.
    ConnectFailed { detail: String },
    /// Display timer tick advancing the log reveal cursor.
    RevealTick,
    /// The post-stop delay elapsed; return to the form.
    ReturnToFormElapsed,
    /// Restore previously completed runs from persisted state.
    RestoreCompletedRuns(Vec<crate::CompletedRunSnapshot>),
    /// Fallback for placeholder wiring.
    NoOp,
}
