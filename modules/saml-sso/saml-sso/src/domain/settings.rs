//! Option lifecycle: install defaults, load, validate-and-save, uninstall.
//!
//! Options live in the host [`OptionStore`]. After every load or save the
//! service publishes an [`ActiveSettings`] snapshot holding the parsed
//! settings and, when both the install path and auth source are set, a
//! connected identity-provider client.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use saml_sso_sdk::{
    FormatTemplate, IdentityProviderClient, IdentityProviderPlugin, MatchField, MatchPolicy,
    SamlSsoError,
};
use serde::Serialize;
use url::Url;

use super::error::DomainError;
use super::forms::{self, FormDescriptor};
use crate::host::OptionStore;

/// Option keys in the host store.
pub mod keys {
    pub const PATH: &str = "saml_sso_path";
    pub const AUTH_SOURCE: &str = "saml_sso_auth_source";
    pub const REQUIRED: &str = "saml_sso_required";
    pub const ATTRIBUTE: &str = "saml_sso_attribute";
    pub const FORMAT: &str = "saml_sso_format";
    pub const EMAIL: &str = "saml_sso_email";
    pub const PLUGIN_TITLE: &str = "saml_sso_plugin_title";
    pub const PLUGIN_BUTTON: &str = "saml_sso_plugin_button";
    pub const DEFAULT_TITLE: &str = "saml_sso_default_title";
    pub const LOGOUT_URL: &str = "saml_sso_logout_url";

    /// Every key with its installed default.
    pub const DEFAULTS: [(&str, &str); 10] = [
        (PATH, ""),
        (AUTH_SOURCE, ""),
        (REQUIRED, ""),
        (ATTRIBUTE, "uid"),
        (FORMAT, "%s"),
        (EMAIL, ""),
        (PLUGIN_TITLE, ""),
        (PLUGIN_BUTTON, ""),
        (DEFAULT_TITLE, ""),
        (LOGOUT_URL, ""),
    ];
}

/// Button label used when none is configured.
pub const DEFAULT_BUTTON_LABEL: &str = "Single Sign-On Log In";

const INVALID_INSTALLATION: &str =
    "A path to a valid SSO installation must be specified to use this plugin.";
const UNSUPPORTED_SESSION_STORE: &str =
    "The SSO installation must not use the native session store when used with this plugin.";
const INVALID_AUTH_SOURCE: &str =
    "A valid SSO authentication source ID must be specified to use this plugin.";

/// Option values as stored. Missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SsoSettings {
    pub install_path: String,
    pub auth_source: String,
    pub required: bool,
    pub attribute: String,
    pub format: String,
    pub match_email: bool,
    pub plugin_title: String,
    pub plugin_button: String,
    pub default_title: String,
    pub logout_url: String,
}

impl SsoSettings {
    /// Whether both provider options are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.install_path.is_empty() && !self.auth_source.is_empty()
    }

    /// Label for the SSO login button.
    #[must_use]
    pub fn button_label(&self) -> &str {
        if self.plugin_button.is_empty() {
            DEFAULT_BUTTON_LABEL
        } else {
            &self.plugin_button
        }
    }

    /// Match policy derived from the attribute, format and email options.
    ///
    /// # Errors
    ///
    /// `Validation` on `saml_sso_format` if a non-empty format is malformed.
    pub fn match_policy(&self) -> Result<MatchPolicy, DomainError> {
        let field = if self.match_email {
            MatchField::Email
        } else {
            MatchField::Username
        };
        let mut policy = MatchPolicy::new(self.attribute.clone()).matching(field);
        if !self.format.is_empty() {
            let format = FormatTemplate::parse(&self.format)
                .map_err(|e| DomainError::validation(keys::FORMAT, e.to_string()))?;
            policy = policy.with_format(format);
        }
        Ok(policy)
    }
}

fn truthy(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0")
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "" }
}

/// An administrator's configuration form submission.
///
/// `None` means the field was not posted. Posted optional fields are stored;
/// unposted ones are deleted. Path and auth source are always written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSubmission {
    pub install_path: String,
    pub auth_source: String,
    pub required: Option<bool>,
    pub attribute: Option<String>,
    pub format: Option<String>,
    pub match_email: Option<bool>,
    pub plugin_title: Option<String>,
    pub plugin_button: Option<String>,
    pub default_title: Option<String>,
    pub logout_url: Option<String>,
}

/// Settings snapshot used by request handling.
pub struct ActiveSettings {
    pub settings: SsoSettings,
    provider: Option<(Arc<dyn IdentityProviderClient>, MatchPolicy)>,
}

impl ActiveSettings {
    fn disabled(settings: SsoSettings) -> Self {
        Self {
            settings,
            provider: None,
        }
    }

    /// Connected client and match policy, if SSO is usable.
    #[must_use]
    pub fn provider(&self) -> Option<(&Arc<dyn IdentityProviderClient>, &MatchPolicy)> {
        self.provider.as_ref().map(|(client, policy)| (client, policy))
    }

    #[must_use]
    pub fn client(&self) -> Option<&Arc<dyn IdentityProviderClient>> {
        self.provider.as_ref().map(|(client, _)| client)
    }
}

impl fmt::Debug for ActiveSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSettings")
            .field("settings", &self.settings)
            .field("connected", &self.provider.is_some())
            .finish()
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

pub struct SettingsService {
    store: Arc<dyn OptionStore>,
    plugin: Arc<dyn IdentityProviderPlugin>,
    active: ArcSwap<ActiveSettings>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn OptionStore>, plugin: Arc<dyn IdentityProviderPlugin>) -> Self {
        Self {
            store,
            plugin,
            active: ArcSwap::from_pointee(ActiveSettings::disabled(SsoSettings::default())),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<ActiveSettings> {
        self.active.load_full()
    }

    /// Configuration form prefilled from the current snapshot.
    #[must_use]
    pub fn form(&self) -> FormDescriptor {
        forms::config_form(&self.current().settings)
    }

    /// Whether the options have been installed.
    ///
    /// # Errors
    ///
    /// `Storage` if the store cannot be read.
    pub async fn is_installed(&self) -> Result<bool, DomainError> {
        Ok(self.store.get(keys::ATTRIBUTE).await?.is_some())
    }

    /// Write every option with its default, then load.
    ///
    /// # Errors
    ///
    /// `Storage` if the store cannot be written.
    #[tracing::instrument(skip_all)]
    pub async fn install(&self) -> Result<Arc<ActiveSettings>, DomainError> {
        for (key, default) in keys::DEFAULTS {
            self.store.set(key, default).await?;
        }
        tracing::info!("installed SAML SSO options");
        self.load().await
    }

    /// Delete every option and disable SSO.
    ///
    /// # Errors
    ///
    /// `Storage` if the store cannot be written.
    #[tracing::instrument(skip_all)]
    pub async fn uninstall(&self) -> Result<(), DomainError> {
        for (key, _) in keys::DEFAULTS {
            self.store.delete(key).await?;
        }
        self.active
            .store(Arc::new(ActiveSettings::disabled(SsoSettings::default())));
        tracing::info!("uninstalled SAML SSO options");
        Ok(())
    }

    /// Read the options, connect the provider when configured, and publish
    /// the snapshot.
    ///
    /// A provider that cannot be connected leaves SSO disabled; local login
    /// keeps working.
    ///
    /// # Errors
    ///
    /// `Storage` if the store cannot be read.
    #[tracing::instrument(skip_all)]
    pub async fn load(&self) -> Result<Arc<ActiveSettings>, DomainError> {
        let settings = self.read().await?;
        let provider = self.connect(&settings).await;
        let active = Arc::new(ActiveSettings { settings, provider });
        self.active.store(active.clone());
        Ok(active)
    }

    /// Validate a configuration submission, persist it, and reload.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is rejected; nothing is written
    /// - `Provider` if the plugin fails for reasons other than validation
    /// - `Storage` if the store fails
    #[tracing::instrument(skip_all, fields(plugin = self.plugin.name()))]
    pub async fn save(&self, submission: ConfigSubmission) -> Result<Arc<ActiveSettings>, DomainError> {
        self.validate(&submission).await?;

        self.store.set(keys::PATH, &submission.install_path).await?;
        self.store
            .set(keys::AUTH_SOURCE, &submission.auth_source)
            .await?;

        let optional = [
            (keys::REQUIRED, submission.required.map(|v| flag(v).to_owned())),
            (keys::ATTRIBUTE, submission.attribute),
            (keys::FORMAT, submission.format),
            (keys::EMAIL, submission.match_email.map(|v| flag(v).to_owned())),
            (keys::PLUGIN_TITLE, submission.plugin_title),
            (keys::PLUGIN_BUTTON, submission.plugin_button),
            (keys::DEFAULT_TITLE, submission.default_title),
            (keys::LOGOUT_URL, submission.logout_url),
        ];
        for (key, value) in optional {
            match value {
                Some(value) => self.store.set(key, &value).await?,
                None => self.store.delete(key).await?,
            }
        }

        tracing::info!("saved SAML SSO configuration");
        self.load().await
    }

    async fn validate(&self, submission: &ConfigSubmission) -> Result<(), DomainError> {
        let path = Path::new(&submission.install_path);

        // The auth source can only be checked against an installation.
        if !submission.install_path.is_empty() {
            self.plugin
                .validate_installation(path)
                .await
                .map_err(|e| validation_error(e, keys::PATH))?;

            if !submission.auth_source.is_empty() {
                self.plugin
                    .validate_auth_source(path, &submission.auth_source)
                    .await
                    .map_err(|e| validation_error(e, keys::AUTH_SOURCE))?;
            }
        }

        if let Some(attribute) = &submission.attribute
            && attribute.trim().is_empty()
        {
            return Err(DomainError::validation(
                keys::ATTRIBUTE,
                "An identity-provider attribute name must be specified.",
            ));
        }

        if let Some(format) = submission.format.as_deref().filter(|f| !f.is_empty()) {
            FormatTemplate::parse(format)
                .map_err(|e| DomainError::validation(keys::FORMAT, e.to_string()))?;
        }

        if let Some(logout_url) = submission.logout_url.as_deref().filter(|u| !u.is_empty())
            && !logout_url.starts_with('/')
            && Url::parse(logout_url).is_err()
        {
            return Err(DomainError::validation(
                keys::LOGOUT_URL,
                "The logout URL must be an absolute URL or a path starting with \"/\".",
            ));
        }

        Ok(())
    }

    async fn read(&self) -> Result<SsoSettings, DomainError> {
        let text = |value: Option<String>| value.unwrap_or_default();
        Ok(SsoSettings {
            install_path: text(self.store.get(keys::PATH).await?),
            auth_source: text(self.store.get(keys::AUTH_SOURCE).await?),
            required: truthy(self.store.get(keys::REQUIRED).await?.as_deref()),
            attribute: text(self.store.get(keys::ATTRIBUTE).await?),
            format: text(self.store.get(keys::FORMAT).await?),
            match_email: truthy(self.store.get(keys::EMAIL).await?.as_deref()),
            plugin_title: text(self.store.get(keys::PLUGIN_TITLE).await?),
            plugin_button: text(self.store.get(keys::PLUGIN_BUTTON).await?),
            default_title: text(self.store.get(keys::DEFAULT_TITLE).await?),
            logout_url: text(self.store.get(keys::LOGOUT_URL).await?),
        })
    }

    async fn connect(
        &self,
        settings: &SsoSettings,
    ) -> Option<(Arc<dyn IdentityProviderClient>, MatchPolicy)> {
        if !settings.is_configured() {
            tracing::debug!("SSO not configured; local login only");
            return None;
        }

        let policy = match settings.match_policy() {
            Ok(policy) => policy,
            Err(e) => {
                tracing::error!(error = %e, "stored match options are invalid; SSO disabled");
                return None;
            }
        };

        match self
            .plugin
            .connect(Path::new(&settings.install_path), &settings.auth_source)
            .await
        {
            Ok(client) => {
                tracing::info!(
                    plugin = self.plugin.name(),
                    auth_source = %settings.auth_source,
                    "identity provider connected"
                );
                Some((client, policy))
            }
            Err(e) => {
                tracing::error!(
                    plugin = self.plugin.name(),
                    error = %e,
                    "failed to connect identity provider; SSO disabled"
                );
                None
            }
        }
    }
}

fn validation_error(e: SamlSsoError, field: &str) -> DomainError {
    match e {
        SamlSsoError::InvalidInstallation(detail) => {
            tracing::debug!(%detail, "installation rejected");
            DomainError::validation(field, INVALID_INSTALLATION)
        }
        SamlSsoError::UnsupportedSessionStore(detail) => {
            tracing::debug!(%detail, "session store rejected");
            DomainError::validation(field, UNSUPPORTED_SESSION_STORE)
        }
        SamlSsoError::InvalidAuthSource(detail) => {
            tracing::debug!(%detail, "auth source rejected");
            DomainError::validation(field, INVALID_AUTH_SOURCE)
        }
        other => other.into(),
    }
}
