use crate::protocol::{
    classify, LineKind, LINE_CONNECTION_LOST, LINE_CONNECT_FAILED, LINE_STOPPED, LINE_STOP_FAILED,
    LINE_VALIDATING,
};
use crate::{AppState, Effect, Msg, RunOutcome, SessionPhase, StopOutcome, RETURN_TO_FORM_DELAY};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FormSubmitted {
            username,
            password,
            session_id,
        } => {
            if state.phase() != SessionPhase::FormEntry
                || username.trim().is_empty()
                || password.trim().is_empty()
            {
                return (state, Vec::new());
            }
            state.start_run(session_id.clone());
            vec![Effect::OpenSocket {
                session_id,
                username,
                password,
            }]
        }
        Msg::TwoFactorSubmitted { code } => {
            if state.phase() != SessionPhase::AwaitingTwoFactor || code.trim().is_empty() {
                return (state, Vec::new());
            }
            let Some(session_id) = state.session_id().cloned() else {
                return (state, Vec::new());
            };
            state.set_phase(SessionPhase::Running);
            state.set_loading(false);
            vec![Effect::SendTwoFactor { session_id, code }]
        }
        Msg::StopClicked => {
            if !is_live(&state) || state.stop_in_flight() {
                return (state, Vec::new());
            }
            let Some(session_id) = state.session_id().cloned() else {
                return (state, Vec::new());
            };
            state.set_stop_in_flight(true);
            vec![Effect::RequestStop { session_id }]
        }
        Msg::StopResult(outcome) => {
            state.set_stop_in_flight(false);
            if !is_live(&state) {
                // Sentinel or socket close already ended the run.
                return (state, Vec::new());
            }
            match outcome {
                StopOutcome::Confirmed => {
                    state.push_line(LINE_STOPPED.to_owned());
                    state.set_loading(false);
                    state.set_phase(SessionPhase::Stopped);
                    state.record_run(RunOutcome::Stopped);
                    vec![
                        Effect::CloseSocket,
                        Effect::ScheduleReturnToForm {
                            delay: RETURN_TO_FORM_DELAY,
                        },
                    ]
                }
                StopOutcome::Rejected { .. } => {
                    // Worker keeps running; no transition, no retry.
                    state.push_line(LINE_STOP_FAILED.to_owned());
                    Vec::new()
                }
                StopOutcome::Unreachable { .. } => {
                    // Force-close the socket anyway and still leave via the form.
                    state.push_line(LINE_STOP_FAILED.to_owned());
                    state.set_loading(false);
                    state.set_phase(SessionPhase::Stopped);
                    state.record_run(RunOutcome::Aborted);
                    vec![
                        Effect::CloseSocket,
                        Effect::ScheduleReturnToForm {
                            delay: RETURN_TO_FORM_DELAY,
                        },
                    ]
                }
            }
        }
        Msg::LineReceived(raw) => {
            if !is_live(&state) {
                return (state, Vec::new());
            }
            let line = classify(&raw);
            state.push_line(line.text);
            match line.kind {
                LineKind::Status => Vec::new(),
                LineKind::AuthSucceeded => {
                    state.set_loading(false);
                    Vec::new()
                }
                LineKind::WrongPassword => {
                    state.set_loading(false);
                    state.set_phase(SessionPhase::FormEntry);
                    state.record_run(RunOutcome::WrongPassword);
                    vec![Effect::CloseSocket]
                }
                LineKind::TwoFactorRequested => {
                    state.push_line(LINE_VALIDATING.to_owned());
                    state.set_phase(SessionPhase::AwaitingTwoFactor);
                    Vec::new()
                }
                LineKind::ProcessStopped => {
                    state.set_loading(false);
                    state.set_phase(SessionPhase::Stopped);
                    state.record_run(RunOutcome::Stopped);
                    vec![
                        Effect::CloseSocket,
                        Effect::ScheduleReturnToForm {
                            delay: RETURN_TO_FORM_DELAY,
                        },
                    ]
                }
            }
        }
        Msg::SocketClosed { clean: _ } => {
            if !is_live(&state) {
                return (state, Vec::new());
            }
            state.set_loading(false);
            if state.stop_in_flight() {
                // Stop result is still on its way; let it settle the run.
                return (state, Vec::new());
            }
            state.push_line(LINE_CONNECTION_LOST.to_owned());
            state.set_phase(SessionPhase::FormEntry);
            state.record_run(RunOutcome::ConnectionLost);
            Vec::new()
        }
        Msg::ConnectFailed { detail: _ } => {
            if state.phase() != SessionPhase::Running {
                return (state, Vec::new());
            }
            state.push_line(LINE_CONNECT_FAILED.to_owned());
            state.set_loading(false);
            state.set_phase(SessionPhase::FormEntry);
            Vec::new()
        }
        Msg::RevealTick => {
            state.advance_cursor();
            Vec::new()
        }
        Msg::ReturnToFormElapsed => {
            if state.phase() == SessionPhase::Stopped {
                state.set_phase(SessionPhase::FormEntry);
            }
            Vec::new()
        }
        Msg::RestoreCompletedRuns(runs) => {
            state.restore_completed_runs(runs);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_live(state: &AppState) -> bool {
    matches!(
        state.phase(),
        SessionPhase::Running | SessionPhase::AwaitingTwoFactor
    )
}
