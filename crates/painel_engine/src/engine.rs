use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use painel_logging::painel_error;

use crate::control::{ControlClient, ControlSettings};
use crate::types::{ControlFailure, EngineEvent};
use crate::worker::{run_session, SessionCommand, StartPayload, TwoFactorPayload, WorkerSettings};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub worker: WorkerSettings,
    pub control: ControlSettings,
}

enum EngineCommand {
    OpenSession(StartPayload),
    SendTwoFactor(TwoFactorPayload),
    RequestStop { session_id: String },
    CloseSession,
}

/// Handle to the IO thread. Commands go in over a channel; events come back
/// out and are polled with [`EngineHandle::try_recv`].
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Inner>,
}

struct Inner {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let control = match ControlClient::new(config.control.clone()) {
                Ok(client) => Some(client),
                Err(err) => {
                    painel_error!("control client unavailable: {}", err);
                    None
                }
            };

            // At most one live session; commands for a dead session are dropped.
            let mut session: Option<tokio::sync::mpsc::UnboundedSender<SessionCommand>> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::OpenSession(payload) => {
                        let (session_tx, session_rx) = tokio::sync::mpsc::unbounded_channel();
                        session = Some(session_tx);
                        runtime.spawn(run_session(
                            config.worker.clone(),
                            payload,
                            session_rx,
                            event_tx.clone(),
                        ));
                    }
                    EngineCommand::SendTwoFactor(payload) => {
                        if let Some(session_tx) = &session {
                            let _ = session_tx.send(SessionCommand::SendTwoFactor(payload));
                        }
                    }
                    EngineCommand::CloseSession => {
                        if let Some(session_tx) = session.take() {
                            let _ = session_tx.send(SessionCommand::Close);
                        }
                    }
                    EngineCommand::RequestStop { session_id } => match &control {
                        Some(client) => {
                            let client = client.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = client.stop(&session_id).await;
                                let _ = event_tx.send(EngineEvent::StopResult {
                                    session_id,
                                    result,
                                });
                            });
                        }
                        None => {
                            let _ = event_tx.send(EngineEvent::StopResult {
                                session_id,
                                result: Err(ControlFailure::Unreachable {
                                    detail: "control client unavailable".to_owned(),
                                }),
                            });
                        }
                    },
                }
            }
        });

        Self {
            inner: Arc::new(Inner {
                cmd_tx,
                event_rx: Mutex::new(event_rx),
            }),
        }
    }

    pub fn open_session(&self, payload: StartPayload) {
        let _ = self.inner.cmd_tx.send(EngineCommand::OpenSession(payload));
    }

    pub fn send_two_factor(&self, payload: TwoFactorPayload) {
        let _ = self.inner.cmd_tx.send(EngineCommand::SendTwoFactor(payload));
    }

    pub fn request_stop(&self, session_id: impl Into<String>) {
        let _ = self.inner.cmd_tx.send(EngineCommand::RequestStop {
            session_id: session_id.into(),
        });
    }

    pub fn close_session(&self) {
        let _ = self.inner.cmd_tx.send(EngineCommand::CloseSession);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.inner.event_rx.lock().ok()?.try_recv().ok()
    }
}
