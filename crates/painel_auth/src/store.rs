use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document in the `authorized_emails` collection, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedEmailRecord {
    pub email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Document in the `admin_users` collection, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministratorRecord {
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed document: {0}")]
    Decode(String),
}

/// Remote document store holding the authorization collections.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn find_authorized_email(
        &self,
        email: &str,
    ) -> Result<Option<AuthorizedEmailRecord>, StoreError>;
    async fn put_authorized_email(&self, record: &AuthorizedEmailRecord) -> Result<(), StoreError>;
    async fn delete_authorized_email(&self, email: &str) -> Result<(), StoreError>;
    async fn list_authorized_emails(&self) -> Result<Vec<AuthorizedEmailRecord>, StoreError>;
    async fn list_administrators(&self) -> Result<Vec<AdministratorRecord>, StoreError>;
    async fn put_administrator(&self, record: &AdministratorRecord) -> Result<(), StoreError>;
    async fn delete_administrator(&self, email: &str) -> Result<(), StoreError>;
    /// Rewrite the denormalized roster document used for security-rule checks.
    async fn put_admin_roster(&self, emails: &[String]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl StoreSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// REST-backed [`DirectoryStore`]: one resource per collection, documents
/// addressed by normalized email.
#[derive(Debug, Clone)]
pub struct RestDirectoryStore {
    client: reqwest::Client,
    settings: StoreSettings,
}

#[derive(Serialize)]
struct AdminRoster<'a> {
    emails: &'a [String],
}

impl RestDirectoryStore {
    pub fn new(settings: StoreSettings) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StoreError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DirectoryStore for RestDirectoryStore {
    async fn find_authorized_email(
        &self,
        email: &str,
    ) -> Result<Option<AuthorizedEmailRecord>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("authorized_emails/{email}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        match response.status() {
            status if status.is_success() => {
                let record = response
                    .json::<AuthorizedEmailRecord>()
                    .await
                    .map_err(|err| StoreError::Decode(err.to_string()))?;
                Ok(Some(record))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn put_authorized_email(&self, record: &AuthorizedEmailRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(&format!("authorized_emails/{}", record.email)))
            .json(record)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response.status())
    }

    async fn delete_authorized_email(&self, email: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("authorized_emails/{email}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        // Deleting an absent document is fine; the outcome is the same.
        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Ok(()),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn list_authorized_emails(&self) -> Result<Vec<AuthorizedEmailRecord>, StoreError> {
        let response = self
            .client
            .get(self.url("authorized_emails"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }

    async fn list_administrators(&self) -> Result<Vec<AdministratorRecord>, StoreError> {
        let response = self
            .client
            .get(self.url("admin_users"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }

    async fn put_administrator(&self, record: &AdministratorRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(&format!("admin_users/{}", record.email)))
            .json(record)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response.status())
    }

    async fn delete_administrator(&self, email: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("admin_users/{email}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Ok(()),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn put_admin_roster(&self, emails: &[String]) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url("config/admin_roster"))
            .json(&AdminRoster { emails })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        expect_success(response.status())
    }
}

fn expect_success(status: reqwest::StatusCode) -> Result<(), StoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Status(status.as_u16()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        return StoreError::Timeout;
    }
    StoreError::Network(err.to_string())
}
