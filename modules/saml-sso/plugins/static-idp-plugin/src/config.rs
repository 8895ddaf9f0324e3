//! Configuration for the static identity-provider plugin.

use saml_sso_sdk::IdentityAssertion;
use serde::{Deserialize, Serialize};

pub const DEFAULT_IDP_BASE_URL: &str = "http://localhost:8080/idp/";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticIdpPluginConfig {
    /// Base URL of the provider's login and logout endpoints. Parsed when
    /// the plugin is built.
    pub idp_base_url: String,

    /// Cookie carrying the provider session id.
    pub session_cookie: String,

    /// Session backend the simulated installation uses.
    pub session_store: SessionStore,

    /// Auth-source ids the installation defines.
    pub auth_sources: Vec<String>,

    /// Authenticated sessions available at startup.
    pub sessions: Vec<SessionFixture>,
}

impl Default for StaticIdpPluginConfig {
    fn default() -> Self {
        Self {
            idp_base_url: DEFAULT_IDP_BASE_URL.to_owned(),
            session_cookie: "idp_session".to_owned(),
            session_store: SessionStore::default(),
            auth_sources: vec!["default-sp".to_owned()],
            sessions: Vec::new(),
        }
    }
}

/// Where the provider keeps its sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStore {
    #[default]
    Sql,
    Memcache,
    Redis,
    /// The language runtime's own session store, which collides with the host's.
    Native,
}

/// One authenticated provider session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionFixture {
    pub session_id: String,

    /// Auth source the session belongs to. `None` means every source.
    #[serde(default)]
    pub auth_source: Option<String>,

    pub attributes: IdentityAssertion,
}
