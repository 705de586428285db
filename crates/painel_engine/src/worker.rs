use std::sync::mpsc;

use futures_util::{SinkExt, StreamExt};
use painel_logging::{painel_debug, painel_warn};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Message;

use crate::types::EngineEvent;

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Websocket URL of the automation worker.
    pub endpoint: String,
}

impl WorkerSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

/// First message on the wire after the socket opens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPayload {
    pub session_id: String,
    pub username: String,
    pub password: String,
}

/// Sent when the operator answers a two-factor challenge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorPayload {
    pub session_id: String,
    pub two_factor_code: String,
}

#[derive(Debug)]
pub(crate) enum SessionCommand {
    SendTwoFactor(TwoFactorPayload),
    Close,
}

/// One socket session: connect, send credentials, then pump frames and
/// commands until either side closes.
pub(crate) async fn run_session(
    settings: WorkerSettings,
    payload: StartPayload,
    mut commands: UnboundedReceiver<SessionCommand>,
    events: mpsc::Sender<EngineEvent>,
) {
    let session_id = payload.session_id.clone();
    let (socket, _response) = match tokio_tungstenite::connect_async(settings.endpoint.as_str()).await
    {
        Ok(pair) => pair,
        Err(err) => {
            painel_warn!("worker connect failed: {}", err);
            let _ = events.send(EngineEvent::ConnectFailed {
                session_id,
                detail: err.to_string(),
            });
            return;
        }
    };
    painel_debug!("worker socket open, session {}", session_id);
    let _ = events.send(EngineEvent::SocketOpened {
        session_id: session_id.clone(),
    });

    let (mut sink, mut stream) = socket.split();

    let credentials = match serde_json::to_string(&payload) {
        Ok(text) => text,
        Err(err) => {
            painel_warn!("credential payload serialization failed: {}", err);
            let _ = sink.close().await;
            let _ = events.send(EngineEvent::SocketClosed {
                session_id,
                clean: false,
            });
            return;
        }
    };
    if sink.send(Message::Text(credentials)).await.is_err() {
        let _ = events.send(EngineEvent::SocketClosed {
            session_id,
            clean: false,
        });
        return;
    }

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::SendTwoFactor(code)) => {
                    let text = match serde_json::to_string(&code) {
                        Ok(text) => text,
                        Err(err) => {
                            painel_warn!("two-factor payload serialization failed: {}", err);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        let _ = events.send(EngineEvent::SocketClosed {
                            session_id,
                            clean: false,
                        });
                        return;
                    }
                }
                // Handle dropped or explicit close: shut the socket down.
                Some(SessionCommand::Close) | None => {
                    let _ = sink.close().await;
                    let _ = events.send(EngineEvent::SocketClosed {
                        session_id,
                        clean: true,
                    });
                    return;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(EngineEvent::Line {
                        session_id: session_id.clone(),
                        text,
                    });
                }
                Some(Ok(Message::Close(_))) | None => {
                    let _ = events.send(EngineEvent::SocketClosed {
                        session_id,
                        clean: true,
                    });
                    return;
                }
                Some(Ok(_)) => {
                    // Binary/ping/pong frames carry no status lines.
                }
                Some(Err(err)) => {
                    painel_warn!("worker socket error: {}", err);
                    let _ = events.send(EngineEvent::SocketClosed {
                        session_id,
                        clean: false,
                    });
                    return;
                }
            },
        }
    }
}
