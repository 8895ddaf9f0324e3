//! Server configuration: defaults, then a YAML file, then `SAML_SSO__*` env vars.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use saml_sso::SamlSsoConfig;
use serde::{Deserialize, Serialize};
use static_idp_plugin::StaticIdpPluginConfig;

pub const ENV_PREFIX: &str = "SAML_SSO__";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8080`.
    pub bind_addr: String,

    /// Request body cap applied to every route.
    pub body_limit_bytes: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    pub logging: LoggingConfig,

    /// SAML SSO module settings.
    pub saml_sso: SamlSsoConfig,

    /// Static identity-provider plugin settings.
    pub static_idp: StaticIdpPluginConfig,

    /// Option values written over the installed defaults at startup.
    pub options: BTreeMap<String, String>,

    /// Accounts created at startup.
    pub accounts: Vec<AccountSeed>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            body_limit_bytes: 1024 * 1024,
            request_timeout_secs: 30,
            logging: LoggingConfig::default(),
            saml_sso: SamlSsoConfig::default(),
            static_idp: StaticIdpPluginConfig::default(),
            options: BTreeMap::new(),
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSeed {
    pub username: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl ServerConfig {
    /// Layer defaults, the optional YAML file, and environment variables.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or a value does not deserialize.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::figment(path)
            .extract()
            .context("failed to load server configuration")
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
