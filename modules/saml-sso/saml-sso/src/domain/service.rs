//! Login, logout and add-user flows.

use std::sync::Arc;

use http::HeaderMap;
use saml_sso_sdk::{AuthenticationOutcome, LocalAccount, SsoSessionId};
use url::Url;

use super::error::DomainError;
use super::resolver::CredentialResolver;
use super::settings::SettingsService;
use crate::config::SamlSsoConfig;
use crate::host::{AccountRegistry, FlashMessage, HostSession, NewAccount, SignInGrant};

pub const INVALID_FORM_MESSAGE: &str = "There was an invalid entry on the form. Please try again.";

/// What the login interceptor does with a request.
#[derive(Debug)]
pub enum LoginDecision {
    /// SSO is not configured; the host login runs untouched.
    PassThrough,
    /// An active account matched and a host session was granted.
    SignedIn(SignInGrant),
    /// SSO is required; send the browser to the provider.
    RedirectToProvider(Url),
    /// Render the host login form with the SSO button.
    ShowLogin(LoginPrompt),
}

/// SSO additions to the host login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    pub login_url: Option<Url>,
    pub plugin_title: Option<String>,
    pub button_label: String,
    pub default_title: Option<String>,
    pub messages: Vec<FlashMessage>,
}

/// Result of a successful add-user submission.
#[derive(Debug, Clone)]
pub struct AddedUser {
    pub account: LocalAccount,
    pub message: FlashMessage,
    pub redirect_to: String,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

// ============================================================================
// Service Implementation
// ============================================================================

pub struct SsoService {
    settings: Arc<SettingsService>,
    resolver: CredentialResolver,
    session: Arc<dyn HostSession>,
    registry: Arc<dyn AccountRegistry>,
    config: SamlSsoConfig,
}

impl SsoService {
    #[must_use]
    pub fn new(
        settings: Arc<SettingsService>,
        resolver: CredentialResolver,
        session: Arc<dyn HostSession>,
        registry: Arc<dyn AccountRegistry>,
        config: SamlSsoConfig,
    ) -> Self {
        Self {
            settings,
            resolver,
            session,
            registry,
            config,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<SettingsService> {
        &self.settings
    }

    #[must_use]
    pub fn config(&self) -> &SamlSsoConfig {
        &self.config
    }

    /// Name of the provider session cookie, when a provider is connected.
    #[must_use]
    pub fn session_cookie_name(&self) -> Option<String> {
        self.settings
            .current()
            .client()
            .map(|client| client.session_cookie_name().to_owned())
    }

    /// Try to log the visitor in through the provider.
    ///
    /// `return_to` is the absolute URL of the login page.
    ///
    /// # Errors
    ///
    /// `Provider` if the provider fails, `Storage` if the account lookup
    /// fails, `Session` if the host cannot grant a session.
    #[tracing::instrument(skip_all, fields(has_session = session.is_some()))]
    pub async fn attempt_login(
        &self,
        headers: &HeaderMap,
        session: Option<&SsoSessionId>,
        return_to: &Url,
    ) -> Result<LoginDecision, DomainError> {
        let active = self.settings.current();
        let Some((client, policy)) = active.provider() else {
            return Ok(LoginDecision::PassThrough);
        };

        let assertion = client.attributes(session).await?;
        let outcome = self.resolver.resolve(&assertion, policy).await?;

        let mut messages = Vec::new();
        match &outcome {
            AuthenticationOutcome::Success(account) => {
                let grant = self.session.sign_in(headers, account).await?;
                tracing::info!(account_id = %account.id, "SSO login succeeded");
                return Ok(LoginDecision::SignedIn(grant));
            }
            AuthenticationOutcome::IdentityNotFound { field, .. } => {
                tracing::warn!(field = field.label(), "SSO identity has no active account");
                messages.extend(outcome.message().map(FlashMessage::error));
            }
            AuthenticationOutcome::IdentityAmbiguous { attribute } => {
                if client.is_authenticated(session).await? {
                    tracing::warn!(%attribute, "SSO assertion lacks the match attribute");
                    messages.extend(outcome.message().map(FlashMessage::error));
                } else {
                    tracing::debug!("no SSO session");
                }
            }
        }

        let login_url = client.login_url(return_to).await?;

        if active.settings.required {
            for message in messages {
                self.flash(headers, message).await;
            }
            return Ok(LoginDecision::RedirectToProvider(login_url));
        }

        Ok(LoginDecision::ShowLogin(LoginPrompt {
            login_url: Some(login_url),
            plugin_title: non_empty(&active.settings.plugin_title),
            button_label: active.settings.button_label().to_owned(),
            default_title: non_empty(&active.settings.default_title),
            messages,
        }))
    }

    /// Provider login URL for pages outside the login form (e.g. a nav bar).
    ///
    /// # Errors
    ///
    /// `NotConfigured` without a connected provider, `Provider` if the URL
    /// cannot be built.
    pub async fn login_url(&self, return_to: &Url) -> Result<Url, DomainError> {
        let active = self.settings.current();
        let client = active.client().ok_or(DomainError::NotConfigured)?;
        Ok(client.login_url(return_to).await?)
    }

    /// Login page additions when the provider could not be consulted.
    #[must_use]
    pub fn unavailable_prompt(&self) -> LoginPrompt {
        let active = self.settings.current();
        LoginPrompt {
            login_url: None,
            plugin_title: non_empty(&active.settings.plugin_title),
            button_label: active.settings.button_label().to_owned(),
            default_title: non_empty(&active.settings.default_title),
            messages: vec![FlashMessage::error(
                "Single sign-on is temporarily unavailable. Please try again later.",
            )],
        }
    }

    /// Provider single-logout URL, if the provider session is authenticated.
    ///
    /// `base` is the site's absolute URL; the configured logout URL (or the
    /// home path) is resolved against it.
    ///
    /// # Errors
    ///
    /// `Provider` if the provider fails, `Internal` if the target URL cannot
    /// be built.
    #[tracing::instrument(skip_all, fields(has_session = session.is_some()))]
    pub async fn logout_redirect(
        &self,
        session: Option<&SsoSessionId>,
        base: &Url,
    ) -> Result<Option<Url>, DomainError> {
        let active = self.settings.current();
        let Some(client) = active.client() else {
            return Ok(None);
        };

        let target = if active.settings.logout_url.is_empty() {
            &self.config.home_path
        } else {
            &active.settings.logout_url
        };
        let redirect_to = base
            .join(target.trim_start_matches('/'))
            .map_err(|e| DomainError::internal(format!("invalid logout target: {e}")))?;

        if !client.is_authenticated(session).await? {
            tracing::debug!("no authenticated SSO session to end");
            return Ok(None);
        }

        let url = client.logout(session, &redirect_to).await?;
        tracing::info!("ending SSO session");
        Ok(Some(url))
    }

    /// Validate and create a host account, then flash the outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidForm` if a required field is missing or malformed
    /// - `Rejected` if the host registry refuses the account
    /// - `Storage` if the registry fails
    #[tracing::instrument(skip_all, fields(username = %account.username, active = account.active))]
    pub async fn add_user(
        &self,
        headers: &HeaderMap,
        account: NewAccount,
    ) -> Result<AddedUser, DomainError> {
        let errors = self.validate_new_account(&account);
        if !errors.is_empty() {
            return Err(DomainError::InvalidForm { errors });
        }

        let created = self.registry.create_account(account).await?;

        let delivered = created.active || self.registry.send_activation_email(&created).await;
        let message = if delivered {
            FlashMessage::success(format!(
                "The user \"{}\" was successfully added!",
                created.username
            ))
        } else {
            tracing::warn!(account_id = %created.id, "activation email could not be sent");
            FlashMessage::error(format!(
                "The user \"{}\" was added, but the activation email could not be sent.",
                created.username
            ))
        };

        self.flash(headers, message.clone()).await;
        tracing::info!(account_id = %created.id, "user added");

        Ok(AddedUser {
            account: created,
            message,
            redirect_to: self.config.browse_users_path.clone(),
        })
    }

    fn validate_new_account(&self, account: &NewAccount) -> Vec<String> {
        let mut errors = Vec::new();
        if account.username.trim().is_empty() {
            errors.push("Username is required.".to_owned());
        }
        if account.name.trim().is_empty() {
            errors.push("Display name is required.".to_owned());
        }
        match account.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => errors.push("A valid email address is required.".to_owned()),
        }
        if !self.config.roles.iter().any(|role| role == &account.role) {
            errors.push(format!("\"{}\" is not a valid role.", account.role));
        }
        errors
    }

    async fn flash(&self, headers: &HeaderMap, message: FlashMessage) {
        if let Err(e) = self.session.flash(headers, message).await {
            tracing::warn!(error = %e, "failed to queue flash message");
        }
    }
}
