use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use painel_core::{CompletedRunSnapshot, RunOutcome};
use painel_logging::{painel_error, painel_info, painel_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const STATE_FILENAME: &str = ".painel_state.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRun {
    session_id: String,
    outcome: String,
    lines: usize,
    finished_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    completed: Vec<PersistedRun>,
}

fn outcome_tag(outcome: RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Stopped => "stopped",
        RunOutcome::WrongPassword => "wrong_password",
        RunOutcome::ConnectionLost => "connection_lost",
        RunOutcome::Aborted => "aborted",
    }
}

fn parse_outcome(tag: &str) -> Option<RunOutcome> {
    match tag {
        "stopped" => Some(RunOutcome::Stopped),
        "wrong_password" => Some(RunOutcome::WrongPassword),
        "connection_lost" => Some(RunOutcome::ConnectionLost),
        "aborted" => Some(RunOutcome::Aborted),
        _ => None,
    }
}

fn read_persisted(dir: &Path) -> PersistedState {
    let path = dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedState::default();
        }
        Err(err) => {
            painel_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return PersistedState::default();
        }
    };

    match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            painel_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            PersistedState::default()
        }
    }
}

pub(crate) fn load_completed_runs(dir: &Path) -> Vec<CompletedRunSnapshot> {
    let state = read_persisted(dir);
    if state.completed.is_empty() {
        return Vec::new();
    }

    let runs: Vec<CompletedRunSnapshot> = state
        .completed
        .into_iter()
        .filter_map(|run| match parse_outcome(&run.outcome) {
            Some(outcome) => Some(CompletedRunSnapshot {
                session_id: run.session_id,
                outcome,
                lines: run.lines,
            }),
            None => {
                painel_warn!("Dropping persisted run with unknown outcome {:?}", run.outcome);
                None
            }
        })
        .collect();

    painel_info!("Loaded {} persisted run(s)", runs.len());
    runs
}

pub(crate) fn save_completed_runs(dir: &Path, completed: &[CompletedRunSnapshot]) {
    // Keep the original timestamps for rows already on disk; new rows get now.
    // Keyed by session id so a dropped row cannot shift timestamps around.
    let existing: HashMap<String, String> = read_persisted(dir)
        .completed
        .into_iter()
        .map(|row| (row.session_id, row.finished_at))
        .collect();
    let stamp = Utc::now().to_rfc3339();

    let state = PersistedState {
        completed: completed
            .iter()
            .map(|run| PersistedRun {
                session_id: run.session_id.clone(),
                outcome: outcome_tag(run.outcome).to_owned(),
                lines: run.lines,
                finished_at: existing
                    .get(&run.session_id)
                    .cloned()
                    .unwrap_or_else(|| stamp.clone()),
            })
            .collect(),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            painel_error!("Failed to serialize persisted state: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomic(dir, STATE_FILENAME, &content) {
        painel_error!("Failed to write persisted state to {:?}: {}", dir, err);
    }
}

/// Write a temp file in `dir` then rename it over the target.
fn write_atomic(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}
