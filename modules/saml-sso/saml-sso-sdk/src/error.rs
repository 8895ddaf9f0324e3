//! Error types for the SAML SSO module.

use thiserror::Error;

/// Errors that can occur when using the SAML SSO API.
#[derive(Debug, Error)]
pub enum SamlSsoError {
    /// The configured path does not point at a usable identity-provider installation.
    #[error("invalid installation: {0}")]
    InvalidInstallation(String),

    /// The installation stores its sessions in a backend that cannot be shared with the host.
    #[error("unsupported session store: {0}")]
    UnsupportedSessionStore(String),

    /// The auth-source ID is not known to the installation.
    #[error("invalid auth source: {0}")]
    InvalidAuthSource(String),

    /// The identity provider failed while serving a request.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Host account storage failed.
    #[error("account storage error: {0}")]
    Storage(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
