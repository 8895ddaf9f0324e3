#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared harness: the module wired to in-memory host collaborators and the
//! static identity provider, with a minimal host router around it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Extension, Json, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use saml_sso::domain::ConfigSubmission;
use saml_sso::host::{FlashMessage, HostError, HostSession, SignInGrant};
use saml_sso::infra::{InMemoryAccounts, InMemoryOptionStore};
use saml_sso::{HostRoutes, LoginView, SamlSso, SamlSsoConfig, SamlSsoDeps};
use saml_sso_sdk::{IdentityAssertion, LocalAccount};
use serde_json::{Value, json};
use static_idp_plugin::{StaticIdpPlugin, StaticIdpPluginConfig};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

pub const SITE: &str = "https://site.example.edu/";
pub const IDP: &str = "https://idp.example.edu/simplesaml/";
pub const IDP_COOKIE: &str = "idp_session";
pub const HOST_COOKIE: &str = "host_session=signed-in; Path=/; HttpOnly";

/// Host session that records sign-ins and flash messages.
#[derive(Default)]
pub struct RecordingSession {
    pub sign_ins: Mutex<Vec<Uuid>>,
    pub flashes: Mutex<Vec<FlashMessage>>,
}

impl RecordingSession {
    pub fn sign_ins(&self) -> Vec<Uuid> {
        self.sign_ins.lock().unwrap().clone()
    }

    pub fn flashes(&self) -> Vec<FlashMessage> {
        self.flashes.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostSession for RecordingSession {
    async fn sign_in(
        &self,
        _headers: &HeaderMap,
        account: &LocalAccount,
    ) -> Result<SignInGrant, HostError> {
        self.sign_ins.lock().unwrap().push(account.id);
        Ok(SignInGrant {
            redirect_to: "/admin".to_owned(),
            set_cookies: vec![HeaderValue::from_static(HOST_COOKIE)],
        })
    }

    async fn flash(&self, _headers: &HeaderMap, message: FlashMessage) -> Result<(), HostError> {
        self.flashes.lock().unwrap().push(message);
        Ok(())
    }
}

pub struct Harness {
    pub sso: SamlSso,
    pub accounts: Arc<InMemoryAccounts>,
    pub options: Arc<InMemoryOptionStore>,
    pub session: Arc<RecordingSession>,
    pub plugin: Arc<StaticIdpPlugin>,
    pub install_dir: TempDir,
}

impl Harness {
    /// Installed but not configured.
    pub async fn new() -> Self {
        Self::with_accounts(InMemoryAccounts::new()).await
    }

    pub async fn with_accounts(accounts: InMemoryAccounts) -> Self {
        let accounts = Arc::new(accounts);
        let options = Arc::new(InMemoryOptionStore::new());
        let session = Arc::new(RecordingSession::default());
        let plugin = Arc::new(StaticIdpPlugin::new(StaticIdpPluginConfig {
            idp_base_url: IDP.to_owned(),
            session_cookie: IDP_COOKIE.to_owned(),
            ..StaticIdpPluginConfig::default()
        })
        .unwrap());

        let config = SamlSsoConfig {
            public_base_url: Some(Url::parse(SITE).unwrap()),
            ..SamlSsoConfig::default()
        };
        let sso = SamlSso::new(
            config,
            SamlSsoDeps {
                options: options.clone(),
                plugin: plugin.clone(),
                accounts: accounts.clone(),
                registry: accounts.clone(),
                session: session.clone(),
            },
        );
        sso.init().await.unwrap();

        Self {
            sso,
            accounts,
            options,
            session,
            plugin,
            install_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn install_path(&self) -> String {
        self.install_dir.path().display().to_string()
    }

    /// A valid submission pointing at the temporary installation.
    pub fn submission(&self) -> ConfigSubmission {
        ConfigSubmission {
            install_path: self.install_path(),
            auth_source: "default-sp".to_owned(),
            attribute: Some("uid".to_owned()),
            format: Some("%s".to_owned()),
            ..ConfigSubmission::default()
        }
    }

    pub async fn configure(&self, submission: ConfigSubmission) {
        self.sso.service().settings().save(submission).await.unwrap();
    }

    pub fn account(&self, username: &str, email: &str, active: bool) -> LocalAccount {
        let account = LocalAccount {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: email.to_owned(),
            active,
        };
        self.accounts.insert(account.clone());
        account
    }

    pub fn open_idp_session(&self, id: &str, assertion: IdentityAssertion) {
        self.plugin.sessions().open(id, None, assertion);
    }

    pub fn router(&self) -> Router {
        let host = HostRoutes {
            login: get(host_login_page).post(host_login_submit),
            logout: get(host_logout),
        };
        self.sso
            .register_rest(Router::new().route("/", get(|| async { "home" })), host)
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router().oneshot(req).await.unwrap()
    }
}

async fn host_login_page(view: Option<Extension<LoginView>>) -> Json<Value> {
    Json(json!({ "view": view.map(|Extension(v)| v) }))
}

async fn host_login_submit(view: Option<Extension<LoginView>>, body: String) -> Json<Value> {
    Json(json!({ "local": true, "body": body, "view": view.map(|Extension(v)| v) }))
}

async fn host_logout() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/"),
            (header::SET_COOKIE, "host_session=; Max-Age=0; Path=/"),
        ],
    )
}

pub fn get_with_idp_session(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = session {
        builder = builder.header(header::COOKIE, format!("{IDP_COOKIE}={id}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn uid(values: &[&str]) -> IdentityAssertion {
    IdentityAssertion::new().with("uid", values.iter().map(|v| (*v).to_owned()).collect())
}

pub async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_owned()
}
