use std::fs;
use std::path::Path;

use painel_logging::painel_warn;
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "painel.ron";

/// Endpoints the shell talks to. Loaded from `./painel.ron` when present;
/// missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Websocket URL of the automation worker.
    pub worker_endpoint: String,
    /// HTTP URL of the worker's stop endpoint.
    pub control_endpoint: String,
    /// Base URL of the directory service (authorized emails, administrators).
    pub directory_base_url: String,
    /// Base URL of the identity provider.
    pub identity_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            worker_endpoint: "wss://pythonfastapi-production-437e.up.railway.app/ws".to_owned(),
            control_endpoint: "https://pythonfastapi-production-437e.up.railway.app/stop"
                .to_owned(),
            directory_base_url: "https://pythonfastapi-production-437e.up.railway.app/directory"
                .to_owned(),
            identity_base_url: "https://pythonfastapi-production-437e.up.railway.app/auth"
                .to_owned(),
        }
    }
}

pub(crate) fn load(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            painel_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            painel_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
