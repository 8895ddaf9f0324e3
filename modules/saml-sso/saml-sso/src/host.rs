//! Host application seams.
//!
//! The host owns sessions, account creation and option persistence. The
//! module only talks to it through these traits.

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue};
use saml_sso_sdk::LocalAccount;
use serde::Serialize;
use thiserror::Error;

/// Failures reported by host collaborators.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host refused the input; messages are safe to show to the user.
    #[error("rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("session error: {0}")]
    Session(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Session granted after a successful SSO match.
#[derive(Debug, Clone, Default)]
pub struct SignInGrant {
    /// Where the browser goes next (usually the page that asked for login).
    pub redirect_to: String,
    /// `Set-Cookie` values establishing the host session.
    pub set_cookies: Vec<HeaderValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

/// Host session management.
#[async_trait]
pub trait HostSession: Send + Sync {
    /// Establish a host session for `account`.
    ///
    /// `headers` are the incoming request headers, so the host can find the
    /// pre-login session holding the post-login redirect target.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cannot be created
    async fn sign_in(
        &self,
        headers: &HeaderMap,
        account: &LocalAccount,
    ) -> Result<SignInGrant, HostError>;

    /// Queue a flash message for the session identified by `headers`.
    ///
    /// # Errors
    ///
    /// - `Session` if the session cannot be written
    async fn flash(&self, headers: &HeaderMap, message: FlashMessage) -> Result<(), HostError>;
}

/// Data for a new host account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
}

/// Host account creation.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// Persist a new account.
    ///
    /// # Errors
    ///
    /// - `Rejected` if the host's record validation fails (duplicate username, ...)
    /// - `Storage` if persistence fails
    async fn create_account(&self, account: NewAccount) -> Result<LocalAccount, HostError>;

    /// Send the activation email for an inactive account. Returns whether it was sent.
    async fn send_activation_email(&self, account: &LocalAccount) -> bool;
}

/// Host key/value option persistence.
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// # Errors
    ///
    /// - `Storage` if the store cannot be read
    async fn get(&self, key: &str) -> Result<Option<String>, HostError>;

    /// # Errors
    ///
    /// - `Storage` if the store cannot be written
    async fn set(&self, key: &str, value: &str) -> Result<(), HostError>;

    /// # Errors
    ///
    /// - `Storage` if the store cannot be written
    async fn delete(&self, key: &str) -> Result<(), HostError>;
}
