//! SAML SSO module wiring.

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use saml_sso_sdk::{AccountLookup, IdentityProviderPlugin};
use tracing::info;

use crate::api::rest::routes;
pub use crate::api::rest::routes::HostRoutes;
use crate::config::SamlSsoConfig;
use crate::domain::{CredentialResolver, SettingsService, SsoService};
use crate::host::{AccountRegistry, HostSession, OptionStore};

/// Host collaborators and the identity-provider plugin.
pub struct SamlSsoDeps {
    pub options: Arc<dyn OptionStore>,
    pub plugin: Arc<dyn IdentityProviderPlugin>,
    pub accounts: Arc<dyn AccountLookup>,
    pub registry: Arc<dyn AccountRegistry>,
    pub session: Arc<dyn HostSession>,
}

/// The SAML SSO module.
///
/// Build it with [`SamlSso::new`], call [`SamlSso::init`] once at startup,
/// then mount it with [`SamlSso::register_rest`].
pub struct SamlSso {
    service: Arc<SsoService>,
}

impl SamlSso {
    #[must_use]
    pub fn new(config: SamlSsoConfig, deps: SamlSsoDeps) -> Self {
        let settings = Arc::new(SettingsService::new(deps.options, deps.plugin.clone()));
        let resolver = CredentialResolver::new(deps.accounts);
        let service = Arc::new(SsoService::new(
            settings,
            resolver,
            deps.session,
            deps.registry,
            config,
        ));

        info!(plugin = deps.plugin.name(), "SAML SSO module created");
        Self { service }
    }

    /// Install default options on first run, then load the settings snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the option store cannot be read or written.
    pub async fn init(&self) -> anyhow::Result<()> {
        let settings = self.service.settings();
        if !settings.is_installed().await? {
            settings.install().await?;
        }
        let active = settings.load().await?;
        info!(
            configured = active.settings.is_configured(),
            connected = active.client().is_some(),
            "SAML SSO settings loaded"
        );
        Ok(())
    }

    /// Remove every option written by this module.
    ///
    /// # Errors
    ///
    /// Fails if the option store cannot be written.
    pub async fn uninstall(&self) -> anyhow::Result<()> {
        self.service.settings().uninstall().await?;
        Ok(())
    }

    #[must_use]
    pub fn service(&self) -> &Arc<SsoService> {
        &self.service
    }

    /// Mount the interceptors around the host handlers and add the module's
    /// own routes.
    #[must_use]
    pub fn register_rest(&self, router: Router, host: HostRoutes) -> Router {
        info!("registering SAML SSO routes");
        routes::register_routes(router, self.service.clone(), host)
    }

    /// Routes the host gateway must keep public.
    #[must_use]
    pub fn public_routes(&self) -> Vec<(Method, &'static str)> {
        routes::public_routes()
    }
}
