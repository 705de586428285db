use std::time::Duration;

use serde::Serialize;

use crate::types::ControlFailure;

#[derive(Debug, Clone)]
pub struct ControlSettings {
    /// Full URL of the stop endpoint.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ControlSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopRequest<'a> {
    session_id: &'a str,
}

/// Out-of-band stop channel to the worker. One POST per request; no retry.
#[derive(Debug, Clone)]
pub struct ControlClient {
    client: reqwest::Client,
    settings: ControlSettings,
}

impl ControlClient {
    pub fn new(settings: ControlSettings) -> Result<Self, ControlFailure> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ControlFailure::Unreachable {
                detail: err.to_string(),
            })?;
        Ok(Self { client, settings })
    }

    /// Ask the worker to interrupt the given run. Idempotent server-side:
    /// stopping an already stopped run still answers 2xx.
    pub async fn stop(&self, session_id: &str) -> Result<(), ControlFailure> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&StopRequest { session_id })
            .send()
            .await
            .map_err(|err| ControlFailure::Unreachable {
                detail: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // The body text is the only diagnostics the endpoint offers.
        let detail = response.text().await.unwrap_or_default();
        Err(ControlFailure::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}
