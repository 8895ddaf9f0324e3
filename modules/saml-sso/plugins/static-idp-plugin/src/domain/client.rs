//! Identity-provider client backed by the session directory.

use std::sync::Arc;

use async_trait::async_trait;
use saml_sso_sdk::{IdentityAssertion, IdentityProviderClient, SamlSsoError, SsoSessionId};
use url::Url;

use super::service::SessionDirectory;

/// Client bound to one auth source.
pub struct StaticIdpClient {
    auth_source: String,
    base_url: Url,
    session_cookie: String,
    sessions: Arc<SessionDirectory>,
}

impl StaticIdpClient {
    #[must_use]
    pub fn new(
        auth_source: String,
        base_url: Url,
        session_cookie: String,
        sessions: Arc<SessionDirectory>,
    ) -> Self {
        Self {
            auth_source,
            base_url,
            session_cookie,
            sessions,
        }
    }

    fn endpoint(&self, action: &str, return_to: &Url) -> Result<Url, SamlSsoError> {
        let mut url = self
            .base_url
            .join(action)
            .map_err(|e| SamlSsoError::Provider(format!("invalid provider URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("AuthId", &self.auth_source)
            .append_pair("ReturnTo", return_to.as_str());
        Ok(url)
    }

    fn lookup(&self, session: Option<&SsoSessionId>) -> Option<IdentityAssertion> {
        session.and_then(|id| self.sessions.attributes(id.expose(), &self.auth_source))
    }
}

#[async_trait]
impl IdentityProviderClient for StaticIdpClient {
    fn session_cookie_name(&self) -> &str {
        &self.session_cookie
    }

    async fn attributes(
        &self,
        session: Option<&SsoSessionId>,
    ) -> Result<IdentityAssertion, SamlSsoError> {
        Ok(self.lookup(session).unwrap_or_default())
    }

    async fn login_url(&self, return_to: &Url) -> Result<Url, SamlSsoError> {
        self.endpoint("login", return_to)
    }

    async fn is_authenticated(
        &self,
        session: Option<&SsoSessionId>,
    ) -> Result<bool, SamlSsoError> {
        Ok(self.lookup(session).is_some())
    }

    async fn logout(
        &self,
        session: Option<&SsoSessionId>,
        redirect_to: &Url,
    ) -> Result<Url, SamlSsoError> {
        if let Some(id) = session
            && self.sessions.end(id.expose())
        {
            tracing::debug!(auth_source = %self.auth_source, "provider session ended");
        }
        self.endpoint("logout", redirect_to)
    }
}
