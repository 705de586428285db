use serde::Deserialize;

/// Sentinel substring sent by legacy workers when the account password is rejected.
pub const SENTINEL_WRONG_PASSWORD: &str = "Senha incorreta";
/// Sentinel substring sent once the worker has authenticated and started working.
pub const SENTINEL_AUTH_SUCCESS: &str = "Autenticação bem-sucedida!";
/// Sentinel substring sent when the worker needs a one-time code.
pub const SENTINEL_TWO_FACTOR: &str = "Digite o código de dois fatores";
/// Sentinel substring sent when the worker acknowledges an interrupted run.
pub const SENTINEL_STOPPED: &str = "Processo interrompido!";

/// Synthetic log entry written when a run starts.
pub const LINE_STARTING: &str = "Iniciando processo...";
/// Synthetic log entry written when a two-factor challenge arrives.
pub const LINE_VALIDATING: &str = "Validando código...";
/// Log entry written when a stop request is confirmed.
pub const LINE_STOPPED: &str = "Processo interrompido!";
/// Log entry written when the control endpoint rejects or cannot take a stop request.
pub const LINE_STOP_FAILED: &str = "Erro ao interromper o processo!";
/// Log entry written when the socket drops without a preceding control line.
pub const LINE_CONNECTION_LOST: &str = "Conexão perdida com o serviço.";
/// Log entry written when the socket could not be opened at all.
pub const LINE_CONNECT_FAILED: &str = "Não foi possível conectar ao serviço.";

/// Envelope version understood by this client.
pub const ENVELOPE_VERSION: u8 = 1;

/// Control meaning carried by one inbound worker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Plain status text with no control meaning.
    Status,
    WrongPassword,
    AuthSucceeded,
    TwoFactorRequested,
    ProcessStopped,
}

/// An inbound line resolved to its control meaning plus display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub text: String,
}

/// Typed message envelope for workers that speak the versioned protocol.
/// Legacy workers send bare status strings instead.
#[derive(Debug, Deserialize)]
struct Envelope {
    v: u8,
    kind: String,
    #[serde(default)]
    text: String,
}

/// Resolve a raw inbound line to its control meaning.
///
/// A well-formed v1 envelope wins; anything else falls back to sentinel
/// substring matching so legacy workers keep working unchanged.
pub fn classify(raw: &str) -> ClassifiedLine {
    if let Ok(envelope) = serde_json::from_str::<Envelope>(raw) {
        if envelope.v == ENVELOPE_VERSION {
            let kind = match envelope.kind.as_str() {
                "wrong_password" => LineKind::WrongPassword,
                "auth_success" => LineKind::AuthSucceeded,
                "two_factor_required" => LineKind::TwoFactorRequested,
                "stopped" => LineKind::ProcessStopped,
                _ => LineKind::Status,
            };
            let text = if envelope.text.is_empty() {
                raw.to_owned()
            } else {
                envelope.text
            };
            return ClassifiedLine { kind, text };
        }
    }

    let kind = if raw.contains(SENTINEL_WRONG_PASSWORD) {
        LineKind::WrongPassword
    } else if raw.contains(SENTINEL_AUTH_SUCCESS) {
        LineKind::AuthSucceeded
    } else if raw.contains(SENTINEL_TWO_FACTOR) {
        LineKind::TwoFactorRequested
    } else if raw.contains(SENTINEL_STOPPED) {
        LineKind::ProcessStopped
    } else {
        LineKind::Status
    };
    ClassifiedLine {
        kind,
        text: raw.to_owned(),
    }
}
