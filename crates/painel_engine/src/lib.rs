//! Painel engine: worker socket session and control-endpoint IO.
mod control;
mod engine;
mod types;
mod worker;

pub use control::{ControlClient, ControlSettings};
pub use engine::{EngineConfig, EngineHandle};
pub use types::{ControlFailure, EngineEvent};
pub use worker::{StartPayload, TwoFactorPayload, WorkerSettings};
