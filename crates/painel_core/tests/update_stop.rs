use painel_core::{
    update, AppState, Effect, Msg, RunOutcome, SessionPhase, StopOutcome, LINE_STOPPED,
    LINE_STOP_FAILED, RETURN_TO_FORM_DELAY, SENTINEL_STOPPED, SENTINEL_TWO_FACTOR,
};

fn running_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::FormSubmitted {
            username: "operador".to_owned(),
            password: "segredo".to_owned(),
            session_id: "run-1".to_owned(),
        },
    );
    state
}

#[test]
fn stop_click_requests_stop_without_transition() {
    let state = running_state();
    let (state, effects) = update(state, Msg::StopClicked);

    assert_eq!(state.view().phase, SessionPhase::Running);
    assert_eq!(
        effects,
        vec![Effect::RequestStop {
            session_id: "run-1".to_owned(),
        }]
    );

    // A second click while the request is in flight does nothing.
    let (state, effects) = update(state, Msg::StopClicked);
    assert!(effects.is_empty());
    assert!(!state.view().can_stop);
}

#[test]
fn confirmed_stop_closes_socket_and_schedules_return() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let (state, effects) = update(state, Msg::StopResult(StopOutcome::Confirmed));
    let view = state.view();

    assert_eq!(view.phase, SessionPhase::Stopped);
    assert!(!view.loading);
    assert_eq!(
        effects,
        vec![
            Effect::CloseSocket,
            Effect::ScheduleReturnToForm {
                delay: RETURN_TO_FORM_DELAY,
            },
        ]
    );

    let snapshot = state.completed_runs_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].outcome, RunOutcome::Stopped);
    assert_eq!(snapshot[0].session_id, "run-1");

    let (state, _) = update(state, Msg::RevealTick);
    assert_eq!(state.view().visible_line.as_deref(), Some(LINE_STOPPED));
}

#[test]
fn rejected_stop_appends_one_error_line_and_stays() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let before = state.view().log_len;
    let (state, effects) = update(
        state,
        Msg::StopResult(StopOutcome::Rejected {
            status: 500,
            detail: "worker busy".to_owned(),
        }),
    );
    let view = state.view();

    assert_eq!(view.phase, SessionPhase::Running);
    assert_eq!(view.log_len, before + 1);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::RevealTick);
    assert_eq!(state.view().visible_line.as_deref(), Some(LINE_STOP_FAILED));
}

#[test]
fn rejected_stop_keeps_two_factor_state() {
    let state = running_state();
    let (state, _) = update(state, Msg::LineReceived(SENTINEL_TWO_FACTOR.into()));
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = update(
        state,
        Msg::StopResult(StopOutcome::Rejected {
            status: 502,
            detail: String::new(),
        }),
    );

    assert_eq!(state.view().phase, SessionPhase::AwaitingTwoFactor);
    // The stop control is usable again after the failure settles.
    let (_state, effects) = update(state, Msg::StopClicked);
    assert_eq!(
        effects,
        vec![Effect::RequestStop {
            session_id: "run-1".to_owned(),
        }]
    );
}

#[test]
fn unreachable_stop_force_closes_and_schedules_return() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let (state, effects) = update(
        state,
        Msg::StopResult(StopOutcome::Unreachable {
            detail: "connection refused".to_owned(),
        }),
    );
    let view = state.view();

    assert_eq!(view.phase, SessionPhase::Stopped);
    assert_eq!(
        effects,
        vec![
            Effect::CloseSocket,
            Effect::ScheduleReturnToForm {
                delay: RETURN_TO_FORM_DELAY,
            },
        ]
    );

    let snapshot = state.completed_runs_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].outcome, RunOutcome::Aborted);
}

#[test]
fn stopped_sentinel_wins_over_late_stop_result() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = update(state, Msg::LineReceived(SENTINEL_STOPPED.into()));
    assert_eq!(state.view().phase, SessionPhase::Stopped);

    let (state, effects) = update(state, Msg::StopResult(StopOutcome::Confirmed));
    assert!(effects.is_empty());
    assert_eq!(state.completed_runs_snapshot().len(), 1);
}

#[test]
fn socket_close_during_stop_waits_for_the_result() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let (state, effects) = update(state, Msg::SocketClosed { clean: true });

    assert_eq!(state.view().phase, SessionPhase::Running);
    assert!(!state.view().loading);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::StopResult(StopOutcome::Confirmed));
    assert_eq!(state.view().phase, SessionPhase::Stopped);
}

#[test]
fn return_delay_brings_the_form_back() {
    let state = running_state();
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = update(state, Msg::StopResult(StopOutcome::Confirmed));
    let (state, effects) = update(state, Msg::ReturnToFormElapsed);

    assert_eq!(state.view().phase, SessionPhase::FormEntry);
    assert!(state.view().show_form);
    assert!(effects.is_empty());
}
