//! Plugin API trait for identity-provider implementations.
//!
//! Plugins validate installations when the administrator saves the
//! configuration and hand out connected clients for request handling.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::IdentityProviderClient;
use crate::error::SamlSsoError;

/// Plugin API trait for identity-provider implementations.
#[async_trait]
pub trait IdentityProviderPlugin: Send + Sync {
    /// Short plugin name used in logs.
    fn name(&self) -> &str;

    /// Check that `install_path` holds a usable installation.
    ///
    /// # Errors
    ///
    /// - `InvalidInstallation` if the path is not an installation
    /// - `UnsupportedSessionStore` if the installation keeps sessions in a
    ///   backend the host cannot share
    async fn validate_installation(&self, install_path: &Path) -> Result<(), SamlSsoError>;

    /// Check that `auth_source` exists in the installation.
    ///
    /// # Errors
    ///
    /// - `InvalidAuthSource` if the source is unknown
    async fn validate_auth_source(
        &self,
        install_path: &Path,
        auth_source: &str,
    ) -> Result<(), SamlSsoError>;

    /// Connect a client for the given installation and auth source.
    ///
    /// # Errors
    ///
    /// - `InvalidInstallation` or `InvalidAuthSource` if the pair is unusable
    async fn connect(
        &self,
        install_path: &Path,
        auth_source: &str,
    ) -> Result<Arc<dyn IdentityProviderClient>, SamlSsoError>;
}
