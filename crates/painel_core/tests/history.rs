use painel_core::{
    update, AppState, CompletedRunSnapshot, Msg, RunOutcome, StopOutcome,
};

fn init_logging() {
    painel_logging::initialize_for_tests();
}

#[test]
fn completed_runs_can_be_restored_for_history() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FormSubmitted {
            username: "operador".to_owned(),
            password: "segredo".to_owned(),
            session_id: "run-1".to_owned(),
        },
    );
    let (state, _) = update(state, Msg::LineReceived("Entrando na conta...".into()));
    let (state, _) = update(state, Msg::StopClicked);
    let (state, _) = update(state, Msg::StopResult(StopOutcome::Confirmed));

    let snapshot = state.completed_runs_snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].session_id, "run-1");
    assert_eq!(snapshot[0].outcome, RunOutcome::Stopped);
    assert_eq!(snapshot[0].lines, 3);

    let (restored, _) = update(AppState::new(), Msg::RestoreCompletedRuns(snapshot));
    let view = restored.view();
    assert_eq!(view.runs.len(), 1);
    assert_eq!(view.runs[0].outcome, RunOutcome::Stopped);
    assert_eq!(view.runs[0].lines, 3);
}

#[test]
fn restore_replaces_stale_history() {
    init_logging();
    let stale = vec![CompletedRunSnapshot {
        session_id: "run-0".to_owned(),
        outcome: RunOutcome::ConnectionLost,
        lines: 4,
    }];
    let (state, _) = update(AppState::new(), Msg::RestoreCompletedRuns(stale));

    let fresh = vec![
        CompletedRunSnapshot {
            session_id: "run-1".to_owned(),
            outcome: RunOutcome::Stopped,
            lines: 7,
        },
        CompletedRunSnapshot {
            session_id: "run-2".to_owned(),
            outcome: RunOutcome::WrongPassword,
            lines: 2,
        },
    ];
    let (state, _) = update(state, Msg::RestoreCompletedRuns(fresh));
    let view = state.view();

    assert_eq!(view.runs.len(), 2);
    assert_eq!(view.runs[1].session_id, "run-2");
}
