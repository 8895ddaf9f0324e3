//! Traits consumed by the SAML SSO module.
//!
//! [`AccountLookup`] is implemented by the host's storage layer;
//! [`IdentityProviderClient`] by an identity-provider plugin.

use async_trait::async_trait;
use url::Url;

use crate::error::SamlSsoError;
use crate::models::{IdentityAssertion, LocalAccount, SsoSessionId};

/// Read-only access to host accounts.
///
/// The resolver never mutates accounts through this trait.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Find the account whose email equals `email`.
    ///
    /// # Errors
    ///
    /// - `Storage` if the host storage fails
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalAccount>, SamlSsoError>;

    /// Find the account whose username equals `username`.
    ///
    /// # Errors
    ///
    /// - `Storage` if the host storage fails
    async fn find_by_username(&self, username: &str)
    -> Result<Option<LocalAccount>, SamlSsoError>;
}

/// Client bound to one identity-provider installation and auth source.
///
/// The provider keeps its own browser session; callers pass the session id
/// read from the cookie named by [`IdentityProviderClient::session_cookie_name`].
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Name of the cookie holding the provider session id.
    fn session_cookie_name(&self) -> &str;

    /// Attributes asserted for the session. Empty when the session is unknown
    /// or not authenticated.
    ///
    /// # Errors
    ///
    /// - `Provider` if the provider cannot be reached
    async fn attributes(
        &self,
        session: Option<&SsoSessionId>,
    ) -> Result<IdentityAssertion, SamlSsoError>;

    /// URL that starts a provider login and returns the browser to `return_to`.
    ///
    /// # Errors
    ///
    /// - `Provider` if the URL cannot be built
    async fn login_url(&self, return_to: &Url) -> Result<Url, SamlSsoError>;

    /// Whether the provider session is authenticated.
    ///
    /// # Errors
    ///
    /// - `Provider` if the provider cannot be reached
    async fn is_authenticated(&self, session: Option<&SsoSessionId>)
    -> Result<bool, SamlSsoError>;

    /// End the provider session and return the single-logout URL the browser
    /// should follow. The provider sends the browser on to `redirect_to`.
    ///
    /// # Errors
    ///
    /// - `Provider` if the logout cannot be started
    async fn logout(
        &self,
        session: Option<&SsoSessionId>,
        redirect_to: &Url,
    ) -> Result<Url, SamlSsoError>;
}
