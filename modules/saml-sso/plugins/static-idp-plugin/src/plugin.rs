//! Static identity-provider plugin.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use saml_sso_sdk::{IdentityProviderClient, IdentityProviderPlugin, SamlSsoError};
use url::Url;

use crate::config::{SessionStore, StaticIdpPluginConfig};
use crate::domain::client::StaticIdpClient;
use crate::domain::service::SessionDirectory;

/// Config-driven [`IdentityProviderPlugin`].
pub struct StaticIdpPlugin {
    config: StaticIdpPluginConfig,
    base_url: Url,
    sessions: Arc<SessionDirectory>,
}

impl StaticIdpPlugin {
    /// Build the plugin from its config.
    ///
    /// # Errors
    ///
    /// `Internal` if `idp_base_url` is not an absolute URL.
    pub fn new(config: StaticIdpPluginConfig) -> Result<Self, SamlSsoError> {
        let base_url = normalized_base(&config.idp_base_url)?;
        let sessions = Arc::new(SessionDirectory::from_fixtures(&config.sessions));
        tracing::info!(
            base_url = %base_url,
            auth_sources = ?config.auth_sources,
            sessions = sessions.len(),
            "static identity provider initialized"
        );
        Ok(Self {
            config,
            base_url,
            sessions,
        })
    }

    /// Shared session directory, for starting sessions at runtime.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionDirectory> {
        &self.sessions
    }
}

/// Parse `raw` and make sure its path ends in '/', so endpoint joins keep it.
fn normalized_base(raw: &str) -> Result<Url, SamlSsoError> {
    let mut url = Url::parse(raw)
        .map_err(|e| SamlSsoError::Internal(format!("invalid idp_base_url '{raw}': {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl IdentityProviderPlugin for StaticIdpPlugin {
    fn name(&self) -> &str {
        "static-idp"
    }

    async fn validate_installation(&self, install_path: &Path) -> Result<(), SamlSsoError> {
        let is_dir = tokio::fs::metadata(install_path)
            .await
            .is_ok_and(|m| m.is_dir());
        if !is_dir {
            return Err(SamlSsoError::InvalidInstallation(format!(
                "{} is not a directory",
                install_path.display()
            )));
        }

        if self.config.session_store == SessionStore::Native {
            return Err(SamlSsoError::UnsupportedSessionStore(
                "installation uses the native session store".to_owned(),
            ));
        }

        Ok(())
    }

    async fn validate_auth_source(
        &self,
        _install_path: &Path,
        auth_source: &str,
    ) -> Result<(), SamlSsoError> {
        if self.config.auth_sources.iter().any(|s| s == auth_source) {
            Ok(())
        } else {
            Err(SamlSsoError::InvalidAuthSource(format!(
                "unknown auth source '{auth_source}'"
            )))
        }
    }

    async fn connect(
        &self,
        install_path: &Path,
        auth_source: &str,
    ) -> Result<Arc<dyn IdentityProviderClient>, SamlSsoError> {
        self.validate_installation(install_path).await?;
        self.validate_auth_source(install_path, auth_source).await?;

        Ok(Arc::new(StaticIdpClient::new(
            auth_source.to_owned(),
            self.base_url.clone(),
            self.config.session_cookie.clone(),
            self.sessions.clone(),
        )))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use saml_sso_sdk::{IdentityAssertion, SsoSessionId};

    use super::*;
    use crate::config::{DEFAULT_IDP_BASE_URL, SessionFixture};

    fn config() -> StaticIdpPluginConfig {
        StaticIdpPluginConfig {
            idp_base_url: "https://idp.example.edu/simplesaml".to_owned(),
            sessions: vec![SessionFixture {
                session_id: "s1".to_owned(),
                auth_source: None,
                attributes: IdentityAssertion::new().with("uid", vec!["jdoe".to_owned()]),
            }],
            ..StaticIdpPluginConfig::default()
        }
    }

    #[tokio::test]
    async fn existing_directory_is_a_valid_installation() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = StaticIdpPlugin::new(config()).unwrap();

        plugin.validate_installation(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_path_and_plain_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.php");
        std::fs::write(&file, b"").unwrap();
        let plugin = StaticIdpPlugin::new(config()).unwrap();

        for path in [dir.path().join("absent"), file] {
            let err = plugin.validate_installation(&path).await.unwrap_err();
            assert!(matches!(err, SamlSsoError::InvalidInstallation(_)));
        }
    }

    #[tokio::test]
    async fn native_session_store_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = StaticIdpPlugin::new(StaticIdpPluginConfig {
            session_store: SessionStore::Native,
            ..config()
        })
        .unwrap();

        let err = plugin.validate_installation(dir.path()).await.unwrap_err();
        assert!(matches!(err, SamlSsoError::UnsupportedSessionStore(_)));
    }

    #[tokio::test]
    async fn unknown_auth_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = StaticIdpPlugin::new(config()).unwrap();

        let err = plugin
            .validate_auth_source(dir.path(), "other-sp")
            .await
            .unwrap_err();
        assert!(matches!(err, SamlSsoError::InvalidAuthSource(_)));
    }

    #[tokio::test]
    async fn connected_client_serves_fixtures_under_normalized_base() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = StaticIdpPlugin::new(config()).unwrap();

        let client = plugin.connect(dir.path(), "default-sp").await.unwrap();

        let attrs = client
            .attributes(Some(&SsoSessionId::new("s1")))
            .await
            .unwrap();
        assert_eq!(attrs.values("uid"), Some(&["jdoe".to_owned()][..]));

        let login = client
            .login_url(&Url::parse("https://site.example.edu/users/login").unwrap())
            .await
            .unwrap();
        assert_eq!(login.path(), "/simplesaml/login");
        assert_eq!(client.session_cookie_name(), "idp_session");
    }

    #[test]
    fn default_config_builds() {
        let plugin = StaticIdpPlugin::new(StaticIdpPluginConfig::default()).unwrap();
        assert_eq!(plugin.base_url.as_str(), DEFAULT_IDP_BASE_URL);
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let err = StaticIdpPlugin::new(StaticIdpPluginConfig {
            idp_base_url: "idp/simplesaml".to_owned(),
            ..config()
        })
        .err()
        .unwrap();
        assert!(matches!(err, SamlSsoError::Internal(ref m) if m.contains("idp_base_url")));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: StaticIdpPluginConfig = serde_json::from_str(
            r#"{"session_store":"redis","sessions":[{"session_id":"a","attributes":{"uid":["x"]}}]}"#,
        )
        .unwrap();

        assert_eq!(cfg.session_store, SessionStore::Redis);
        assert_eq!(cfg.auth_sources, vec!["default-sp".to_owned()]);
        assert_eq!(cfg.sessions.len(), 1);
    }
}
