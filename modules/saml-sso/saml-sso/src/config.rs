//! Configuration for the SAML SSO module.
//!
//! These are deployment settings. The administrator-editable options live in
//! the host option store (see [`crate::domain::settings`]).

use serde::{Deserialize, Serialize};
use url::Url;

fn default_form_body_limit_bytes() -> usize {
    64 * 1024
}

/// Module configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamlSsoConfig {
    /// Absolute site URL used to build return-to URLs.
    ///
    /// When unset, the URL is derived from the request `Host` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<Url>,

    /// Site home, used as the post-logout target when no logout URL is set.
    pub home_path: String,

    /// Users list the add-user form redirects to.
    pub browse_users_path: String,

    /// Largest login or add-user form body the interceptors will buffer.
    pub form_body_limit_bytes: usize,

    /// Roles offered by the add-user form. The first is preselected.
    pub roles: Vec<String>,
}

impl Default for SamlSsoConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            home_path: "/".to_owned(),
            browse_users_path: "/users/browse".to_owned(),
            form_body_limit_bytes: default_form_body_limit_bytes(),
            roles: ["researcher", "contributor", "admin", "super"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}
