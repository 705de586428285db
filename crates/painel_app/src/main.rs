mod app;
mod config;
mod effects;
mod logging;
mod persistence;

fn main() {
    if let Err(err) = app::run_app() {
        eprintln!("painel: {err}");
        std::process::exit(1);
    }
}
