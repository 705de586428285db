use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use painel_core::{Effect, Msg, StopOutcome};
use painel_engine::{
    ControlFailure, ControlSettings, EngineConfig, EngineEvent, EngineHandle, StartPayload,
    TwoFactorPayload, WorkerSettings,
};
use painel_logging::{painel_debug, painel_info, painel_warn};

use crate::config::AppConfig;

/// Runs the side of each dispatch that touches the outside world and pumps
/// engine events back into the message channel. Events tagged with a session
/// other than the one opened last are leftovers from a torn-down socket and
/// are dropped, so they cannot end a freshly started run.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    active_session: Arc<Mutex<Option<String>>>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = EngineHandle::new(EngineConfig {
            worker: WorkerSettings::new(&config.worker_endpoint),
            control: ControlSettings::new(&config.control_endpoint),
        });
        let runner = Self {
            engine,
            msg_tx: msg_tx.clone(),
            active_session: Arc::new(Mutex::new(None)),
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenSocket {
                    session_id,
                    username,
                    password,
                } => {
                    painel_info!("OpenSocket session={}", session_id);
                    *self.active_session.lock().expect("lock active session") =
                        Some(session_id.clone());
                    self.engine.open_session(StartPayload {
                        session_id,
                        username,
                        password,
                    });
                }
                Effect::SendTwoFactor { session_id, code } => {
                    self.engine.send_two_factor(TwoFactorPayload {
                        session_id,
                        two_factor_code: code,
                    });
                }
                Effect::RequestStop { session_id } => {
                    painel_info!("RequestStop session={}", session_id);
                    self.engine.request_stop(session_id);
                }
                Effect::CloseSocket => {
                    self.engine.close_session();
                }
                Effect::ScheduleReturnToForm { delay } => {
                    let tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = tx.send(Msg::ReturnToFormElapsed);
                    });
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        let active = self.active_session.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                let current = active.lock().expect("lock active session").clone();
                if let Some(msg) = event_to_msg(event, current.as_deref()) {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

/// Maps one engine event to a dispatch message, or `None` when the event
/// belongs to a session that is no longer the active one.
fn event_to_msg(event: EngineEvent, active: Option<&str>) -> Option<Msg> {
    match event {
        EngineEvent::SocketOpened { session_id } => {
            painel_debug!("worker socket opened, session {}", session_id);
            None
        }
        EngineEvent::Line { session_id, text } => {
            if active != Some(session_id.as_str()) {
                painel_debug!("dropping line from stale session {}", session_id);
                return None;
            }
            Some(Msg::LineReceived(text))
        }
        EngineEvent::ConnectFailed { session_id, detail } => {
            if active != Some(session_id.as_str()) {
                painel_debug!("dropping connect failure from stale session {}", session_id);
                return None;
            }
            Some(Msg::ConnectFailed { detail })
        }
        EngineEvent::SocketClosed { session_id, clean } => {
            if active != Some(session_id.as_str()) {
                painel_debug!("dropping close from stale session {}", session_id);
                return None;
            }
            Some(Msg::SocketClosed { clean })
        }
        EngineEvent::StopResult { session_id, result } => {
            if active != Some(session_id.as_str()) {
                painel_warn!("dropping stop result from stale session {}", session_id);
                return None;
            }
            Some(Msg::StopResult(map_stop_result(result)))
        }
    }
}

fn map_stop_result(result: Result<(), ControlFailure>) -> StopOutcome {
    match result {
        Ok(()) => StopOutcome::Confirmed,
        Err(ControlFailure::Rejected { status, detail }) => {
            painel_warn!("stop rejected with status {}: {}", status, detail);
            StopOutcome::Rejected { status, detail }
        }
        Err(ControlFailure::Unreachable { detail }) => {
            painel_warn!("control endpoint unreachable: {}", detail);
            StopOutcome::Unreachable { detail }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(session_id: &str) -> EngineEvent {
        EngineEvent::SocketClosed {
            session_id: session_id.to_owned(),
            clean: false,
        }
    }

    #[test]
    fn active_session_events_are_forwarded() {
        let event = EngineEvent::Line {
            session_id: "run-2".to_owned(),
            text: "Coletando seguidores...".to_owned(),
        };
        assert_eq!(
            event_to_msg(event, Some("run-2")),
            Some(Msg::LineReceived("Coletando seguidores...".to_owned()))
        );
        assert_eq!(
            event_to_msg(closed("run-2"), Some("run-2")),
            Some(Msg::SocketClosed { clean: false })
        );
    }

    #[test]
    fn stale_close_cannot_end_the_next_run() {
        // A close draining from the previous session must not be attributed
        // to the run opened afterwards.
        assert_eq!(event_to_msg(closed("run-1"), Some("run-2")), None);
    }

    #[test]
    fn stale_line_and_stop_result_are_dropped() {
        let line = EngineEvent::Line {
            session_id: "run-1".to_owned(),
            text: "Processo interrompido!".to_owned(),
        };
        assert_eq!(event_to_msg(line, Some("run-2")), None);

        let stop = EngineEvent::StopResult {
            session_id: "run-1".to_owned(),
            result: Ok(()),
        };
        assert_eq!(event_to_msg(stop, Some("run-2")), None);
    }

    #[test]
    fn events_before_any_session_are_dropped() {
        assert_eq!(event_to_msg(closed("run-1"), None), None);
    }
}
