use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allowlist::normalize_email;
use crate::messages;
use crate::{AdminRegistry, AuthorizationGate};

/// Raw user object returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: String,
    pub photo_url: Option<String>,
    pub token: String,
}

/// Provider user wrapped into the shape the application works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub avatar: String,
    pub token: String,
    /// Granted role tags; `"user"` always, `"admin"` when recognized.
    pub authority: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{}", messages::INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("{}", messages::ACCOUNT_DISABLED)]
    AccountDisabled,
    #[error("{}", messages::TOO_MANY_ATTEMPTS)]
    TooManyAttempts,
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("{}", messages::EMAIL_NOT_AUTHORIZED)]
    NotAuthorized,
    #[error(transparent)]
    Provider(#[from] IdentityError),
}

/// Email/password authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, IdentityError>;
}

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl IdentitySettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    user_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
}

#[derive(Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(default)]
    error: String,
}

/// REST-backed [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    client: reqwest::Client,
    settings: IdentitySettings,
}

impl RestIdentityProvider {
    pub fn new(settings: IdentitySettings) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| IdentityError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, IdentityError> {
        let url = format!(
            "{}/sign_in",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .json(&SignInRequest { email, password })
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    IdentityError::Timeout
                } else {
                    IdentityError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: SignInResponse = response
                .json()
                .await
                .map_err(|err| IdentityError::Decode(err.to_string()))?;
            return Ok(ProviderUser {
                user_id: body.user_id,
                display_name: body.display_name,
                email: email.to_owned(),
                photo_url: body.photo_url,
                token: body.id_token,
            });
        }

        let body: ProviderErrorBody = response.json().await.unwrap_or_default();
        Err(match body.error.as_str() {
            "INVALID_CREDENTIALS" => IdentityError::InvalidCredentials,
            "USER_DISABLED" => IdentityError::AccountDisabled,
            "TOO_MANY_ATTEMPTS" => IdentityError::TooManyAttempts,
            _ => IdentityError::Status(status.as_u16()),
        })
    }
}

/// Sign-in front door: authorization gate first, then the provider.
pub struct AuthService {
    gate: Arc<AuthorizationGate>,
    admins: Arc<AdminRegistry>,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(
        gate: Arc<AuthorizationGate>,
        admins: Arc<AdminRegistry>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            gate,
            admins,
            provider,
        }
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, SignInError> {
        if !self.gate.is_authorized(email).await {
            return Err(SignInError::NotAuthorized);
        }
        let user = self
            .provider
            .sign_in_with_password(&normalize_email(email), password)
            .await?;
        Ok(self.wrap(user).await)
    }

    /// Gate a user already authenticated by a federated provider.
    pub async fn oauth_sign_in(&self, user: ProviderUser) -> Result<AuthenticatedUser, SignInError> {
        if !self.gate.is_authorized(&user.email).await {
            return Err(SignInError::NotAuthorized);
        }
        Ok(self.wrap(user).await)
    }

    async fn wrap(&self, user: ProviderUser) -> AuthenticatedUser {
        let email = normalize_email(&user.email);
        let mut authority = vec!["user".to_owned()];
        if self.admins.is_admin(&email).await {
            authority.push("admin".to_owned());
        }
        AuthenticatedUser {
            user_id: user.user_id,
            user_name: user.display_name.unwrap_or_else(|| "User".to_owned()),
            email,
            avatar: user.photo_url.unwrap_or_default(),
            token: user.token,
            authority,
        }
    }
}
