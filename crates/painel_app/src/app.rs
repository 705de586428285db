use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use painel_auth::{
    messages, AdminRegistry, AuthCache, AuthService, AuthenticatedUser, AuthorizationGate,
    IdentityError, IdentitySettings, RestDirectoryStore, RestIdentityProvider, SignInError,
    StoreSettings,
};
use painel_core::{update, AppState, ConsoleViewModel, Effect, Msg, REVEAL_INTERVAL};
use painel_logging::{painel_info, painel_warn};
use thiserror::Error;

use crate::config::{self, AppConfig};
use crate::effects::EffectRunner;
use crate::logging::{self, LogDestination};
use crate::persistence;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("auth backend unavailable: {0}")]
    AuthBackend(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn run_app() -> Result<(), AppError> {
    logging::initialize(LogDestination::File);
    let config = config::load(Path::new("."));
    painel_info!("painel starting, worker endpoint {}", config.worker_endpoint);

    let user = sign_in(&config)?;
    println!("Bem-vindo, {}!", user.user_name);
    painel_info!("signed in as {} ({:?})", user.email, user.authority);

    run_console(&config)
}

/// Prompts for credentials on stdin until the gate and the provider both
/// accept. Denials and provider errors are printed and the prompt repeats.
fn sign_in(config: &AppConfig) -> Result<AuthenticatedUser, AppError> {
    let store = Arc::new(
        RestDirectoryStore::new(StoreSettings::new(&config.directory_base_url))
            .map_err(|err| AppError::AuthBackend(err.to_string()))?,
    );
    let gate = Arc::new(AuthorizationGate::new(store.clone(), AuthCache::default()));
    let admins = Arc::new(AdminRegistry::new(store));
    let provider = Arc::new(
        RestIdentityProvider::new(IdentitySettings::new(&config.identity_base_url))
            .map_err(|err| AppError::AuthBackend(err.to_string()))?,
    );
    let service = AuthService::new(gate, admins.clone(), provider);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(admins.bootstrap()) {
        Ok(0) => {}
        Ok(seeded) => painel_info!("seeded {} administrator record(s)", seeded),
        Err(err) => painel_warn!("administrator bootstrap skipped: {}", err),
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let email = prompt(&mut input, "Email: ")?;
        let password = prompt(&mut input, "Senha: ")?;
        match runtime.block_on(service.sign_in(&email, &password)) {
            Ok(user) => return Ok(user),
            // Backend trouble gets the generic line; the details go to the log.
            Err(SignInError::Provider(
                err @ (IdentityError::Network(_)
                | IdentityError::Timeout
                | IdentityError::Status(_)
                | IdentityError::Decode(_)),
            )) => {
                painel_warn!("sign-in backend error: {}", err);
                println!("{}", messages::GENERIC_ERROR);
            }
            Err(err) => println!("{err}"),
        }
    }
}

/// Errors with `UnexpectedEof` when the input is exhausted, so a piped or
/// closed stdin ends the sign-in loop instead of re-prompting forever.
fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed during sign-in",
        ));
    }
    Ok(line.trim().to_owned())
}

fn run_console(config: &AppConfig) -> Result<(), AppError> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config, msg_tx.clone());

    let restored = persistence::load_completed_runs(Path::new("."));
    let mut saved_runs = restored.len();
    if !restored.is_empty() {
        let _ = msg_tx.send(Msg::RestoreCompletedRuns(restored));
    }

    // Display timer advancing the log reveal cursor.
    {
        let tick_tx = msg_tx.clone();
        thread::spawn(move || {
            while tick_tx.send(Msg::RevealTick).is_ok() {
                thread::sleep(REVEAL_INTERVAL);
            }
        });
    }

    let quit = Arc::new(AtomicBool::new(false));
    spawn_command_reader(msg_tx, quit.clone());

    println!("Comandos: start <usuario> <senha> | code <codigo> | stop | sair");

    let mut state = AppState::new();
    let mut tracker = RenderTracker::default();
    let mut run_seq: u64 = 0;

    while let Ok(msg) = msg_rx.recv() {
        if quit.load(Ordering::Relaxed) {
            break;
        }

        let (next, effects) = update(std::mem::take(&mut state), msg);
        state = next;
        // Count runs the core accepted, not every submit attempt.
        if started_run(&effects) {
            run_seq += 1;
            painel_logging::set_run_seq(run_seq);
        }
        runner.enqueue(effects);

        let completed = state.completed_runs_snapshot();
        if completed.len() > saved_runs {
            saved_runs = completed.len();
            persistence::save_completed_runs(Path::new("."), &completed);
        }

        if state.consume_dirty() {
            render(&state.view(), &mut tracker);
        }
    }

    painel_info!("painel shutting down after {} run(s)", run_seq);
    Ok(())
}

fn started_run(effects: &[Effect]) -> bool {
    effects
        .iter()
        .any(|effect| matches!(effect, Effect::OpenSocket { .. }))
}

enum Command {
    Msg(Msg),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "start" => {
            let username = parts.next()?.to_owned();
            let password = parts.next()?.to_owned();
            Some(Command::Msg(Msg::FormSubmitted {
                username,
                password,
                session_id: uuid::Uuid::new_v4().to_string(),
            }))
        }
        "code" => Some(Command::Msg(Msg::TwoFactorSubmitted {
            code: parts.next()?.to_owned(),
        })),
        "stop" => Some(Command::Msg(Msg::StopClicked)),
        "sair" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn spawn_command_reader(msg_tx: mpsc::Sender<Msg>, quit: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(Command::Quit) => break,
                Some(Command::Msg(msg)) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                None => println!("Comando não reconhecido: {line}"),
            }
        }
        // Stdin gone or the user quit; wake the dispatch loop so it exits.
        quit.store(true, Ordering::Relaxed);
        let _ = msg_tx.send(Msg::NoOp);
    });
}

#[derive(Debug)]
struct RenderTracker {
    last_line: Option<String>,
    was_form: bool,
}

impl Default for RenderTracker {
    fn default() -> Self {
        Self {
            last_line: None,
            was_form: true,
        }
    }
}

fn render(view: &ConsoleViewModel, tracker: &mut RenderTracker) {
    if view.visible_line != tracker.last_line {
        if let Some(line) = &view.visible_line {
            println!("{line}");
        }
        tracker.last_line = view.visible_line.clone();
    }
    if view.show_form && !tracker.was_form {
        println!("Sessão encerrada. Digite start <usuario> <senha> para iniciar outra.");
        tracker.last_line = None;
    }
    tracker.was_form = view.show_form;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompt_trims_the_entered_line() {
        let mut input = Cursor::new("  operador@painel.example \n");
        let value = prompt(&mut input, "Email: ").unwrap();
        assert_eq!(value, "operador@painel.example");
    }

    #[test]
    fn prompt_errors_on_closed_input() {
        let mut input = Cursor::new("");
        let err = prompt(&mut input, "Email: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn run_counter_tracks_accepted_submits_only() {
        let (state, effects) = update(
            AppState::new(),
            Msg::FormSubmitted {
                username: "operador".to_owned(),
                password: "segredo".to_owned(),
                session_id: "run-1".to_owned(),
            },
        );
        assert!(started_run(&effects));

        // A submit while a run is live produces no OpenSocket.
        let (_, effects) = update(
            state,
            Msg::FormSubmitted {
                username: "operador".to_owned(),
                password: "segredo".to_owned(),
                session_id: "run-2".to_owned(),
            },
        );
        assert!(!started_run(&effects));
    }

    #[test]
    fn blank_submit_does_not_count_as_a_run() {
        let (_, effects) = update(
            AppState::new(),
            Msg::FormSubmitted {
                username: "operador".to_owned(),
                password: "   ".to_owned(),
                session_id: "run-1".to_owned(),
            },
        );
        assert!(!started_run(&effects));
    }

    #[test]
    fn start_command_mints_a_session_id() {
        let first = parse_command("start operador segredo");
        let second = parse_command("start operador segredo");
        let (Some(Command::Msg(Msg::FormSubmitted {
            username,
            password,
            session_id: first_id,
        })), Some(Command::Msg(Msg::FormSubmitted {
            session_id: second_id,
            ..
        }))) = (first, second)
        else {
            panic!("start did not parse");
        };
        assert_eq!(username, "operador");
        assert_eq!(password, "segredo");
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn start_requires_both_fields() {
        assert!(parse_command("start operador").is_none());
    }

    #[test]
    fn code_and_stop_commands_parse() {
        assert!(matches!(
            parse_command("code 123456"),
            Some(Command::Msg(Msg::TwoFactorSubmitted { .. }))
        ));
        assert!(matches!(
            parse_command("stop"),
            Some(Command::Msg(Msg::StopClicked))
        ));
    }

    #[test]
    fn quit_aliases_parse() {
        assert!(matches!(parse_command("sair"), Some(Command::Quit)));
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_command("dance").is_none());
    }
}
