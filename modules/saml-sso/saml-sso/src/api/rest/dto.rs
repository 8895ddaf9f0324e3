use serde::{Deserialize, Serialize};

use crate::domain::{ActiveSettings, ConfigSubmission, LoginPrompt};
use crate::host::{FlashMessage, NewAccount};

/// SSO additions to the host login page, inserted into request extensions.
///
/// Host login handlers read it with `Option<Extension<LoginView>>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_title: Option<String>,
    pub button_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
    pub messages: Vec<FlashMessage>,
}

impl From<LoginPrompt> for LoginView {
    fn from(p: LoginPrompt) -> Self {
        Self {
            login_url: p.login_url.map(String::from),
            plugin_title: p.plugin_title,
            button_label: p.button_label,
            default_title: p.default_title,
            messages: p.messages,
        }
    }
}

/// Current option values.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsDto {
    pub path: String,
    pub auth_source: String,
    pub required: bool,
    pub attribute: String,
    pub format: String,
    pub match_email: bool,
    pub plugin_title: String,
    pub plugin_button: String,
    pub default_title: String,
    pub logout_url: String,
    /// Whether an identity provider is connected.
    pub connected: bool,
}

impl From<&ActiveSettings> for SettingsDto {
    fn from(active: &ActiveSettings) -> Self {
        let s = &active.settings;
        Self {
            path: s.install_path.clone(),
            auth_source: s.auth_source.clone(),
            required: s.required,
            attribute: s.attribute.clone(),
            format: s.format.clone(),
            match_email: s.match_email,
            plugin_title: s.plugin_title.clone(),
            plugin_button: s.plugin_button.clone(),
            default_title: s.default_title.clone(),
            logout_url: s.logout_url.clone(),
            connected: active.client().is_some(),
        }
    }
}

/// Configuration form submission. Omitted optional fields are deleted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    pub path: Option<String>,
    pub auth_source: Option<String>,
    pub required: Option<bool>,
    pub attribute: Option<String>,
    pub format: Option<String>,
    pub match_email: Option<bool>,
    pub plugin_title: Option<String>,
    pub plugin_button: Option<String>,
    pub default_title: Option<String>,
    pub logout_url: Option<String>,
}

impl From<UpdateSettingsRequest> for ConfigSubmission {
    fn from(r: UpdateSettingsRequest) -> Self {
        Self {
            install_path: r.path.unwrap_or_default(),
            auth_source: r.auth_source.unwrap_or_default(),
            required: r.required,
            attribute: r.attribute,
            format: r.format,
            match_email: r.match_email,
            plugin_title: r.plugin_title,
            plugin_button: r.plugin_button,
            default_title: r.default_title,
            logout_url: r.logout_url,
        }
    }
}

/// Add-user form body (`application/x-www-form-urlencoded`).
///
/// Checkboxes post a value only when checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddUserRequest {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: Option<String>,
}

impl From<AddUserRequest> for NewAccount {
    fn from(r: AddUserRequest) -> Self {
        Self {
            username: r.username.trim().to_owned(),
            name: r.name.trim().to_owned(),
            email: r.email.trim().to_owned(),
            role: r.role,
            active: matches!(r.active.as_deref(), Some(v) if !v.is_empty() && v != "0"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginUrlQuery {
    /// Absolute URL or site path to return to after provider login.
    pub return_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUrlDto {
    pub login_url: String,
}
