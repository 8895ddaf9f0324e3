//! Domain errors for the SAML SSO module.

use saml_sso_sdk::SamlSsoError;

use crate::host::HostError;

/// Internal domain errors.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("invalid form: {}", .errors.join("; "))]
    InvalidForm { errors: Vec<String> },

    #[error("rejected by host: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("single sign-on is not configured")]
    NotConfigured,

    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("host session error: {0}")]
    Session(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<SamlSsoError> for DomainError {
    fn from(e: SamlSsoError) -> Self {
        match e {
            SamlSsoError::InvalidInstallation(msg)
            | SamlSsoError::UnsupportedSessionStore(msg)
            | SamlSsoError::InvalidAuthSource(msg)
            | SamlSsoError::Provider(msg) => Self::Provider(msg),
            SamlSsoError::Storage(msg) => Self::Storage(msg),
            SamlSsoError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<HostError> for DomainError {
    fn from(e: HostError) -> Self {
        match e {
            HostError::Rejected(messages) => Self::Rejected(messages),
            HostError::Session(msg) => Self::Session(msg),
            HostError::Storage(msg) => Self::Storage(msg),
        }
    }
}

impl From<DomainError> for SamlSsoError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Provider(msg) => Self::Provider(msg),
            DomainError::Storage(msg) => Self::Storage(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
