//! Minimal in-memory host application: sessions, flash messages and the
//! login, logout, home and browse pages (as JSON).

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use dashmap::DashMap;
use saml_sso::host::{FlashMessage, HostError, HostSession, SignInGrant};
use saml_sso::infra::InMemoryAccounts;
use saml_sso::{HostRoutes, LoginView, Problem};
use saml_sso_sdk::LocalAccount;
use serde_json::json;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "host_session";

/// Host state shared by the host pages and the module's `HostSession` seam.
pub struct DemoHost {
    accounts: Arc<InMemoryAccounts>,
    /// Session token to signed-in account.
    sessions: DashMap<String, Uuid>,
    /// Session token to pending flash messages.
    flashes: DashMap<String, Vec<FlashMessage>>,
}

impl DemoHost {
    #[must_use]
    pub fn new(accounts: Arc<InMemoryAccounts>) -> Self {
        Self {
            accounts,
            sessions: DashMap::new(),
            flashes: DashMap::new(),
        }
    }

    fn session_token(headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == SESSION_COOKIE)
            .map(|(_, v)| v.to_owned())
            .filter(|v| !v.is_empty())
    }

    fn current_account(&self, headers: &HeaderMap) -> Option<LocalAccount> {
        let token = Self::session_token(headers)?;
        let id = *self.sessions.get(&token)?;
        self.accounts.get(id)
    }

    fn take_flashes(&self, headers: &HeaderMap) -> Vec<FlashMessage> {
        Self::session_token(headers)
            .and_then(|token| self.flashes.remove(&token))
            .map(|(_, messages)| messages)
            .unwrap_or_default()
    }

    /// Host pages other than login and logout.
    #[must_use]
    pub fn pages(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/", get(home))
            .route("/users/browse", get(browse))
            .route("/healthz", get(|| async { "ok" }))
            .with_state(self.clone())
    }

    /// Login and logout handlers for the module to wrap.
    #[must_use]
    pub fn auth_routes(self: &Arc<Self>) -> HostRoutes {
        HostRoutes {
            login: get(login_page)
                .post(local_login)
                .with_state(self.clone()),
            logout: get(logout).with_state(self.clone()),
        }
    }
}

#[async_trait]
impl HostSession for DemoHost {
    async fn sign_in(
        &self,
        headers: &HeaderMap,
        account: &LocalAccount,
    ) -> Result<SignInGrant, HostError> {
        let token = Uuid::new_v4().simple().to_string();
        let cookie = HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
        ))
        .map_err(|e| HostError::Session(e.to_string()))?;

        // Carry flashes queued before login over to the new session.
        if let Some((_, pending)) = Self::session_token(headers).and_then(|t| self.flashes.remove(&t))
        {
            self.flashes.insert(token.clone(), pending);
        }
        self.sessions.insert(token, account.id);

        Ok(SignInGrant {
            redirect_to: "/".to_owned(),
            set_cookies: vec![cookie],
        })
    }

    async fn flash(&self, headers: &HeaderMap, message: FlashMessage) -> Result<(), HostError> {
        let Some(token) = Self::session_token(headers) else {
            tracing::info!(text = %message.text, "flash for visitor without a session");
            return Ok(());
        };
        self.flashes.entry(token).or_default().push(message);
        Ok(())
    }
}

async fn login_page(
    State(host): State<Arc<DemoHost>>,
    headers: HeaderMap,
    view: Option<Extension<LoginView>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "page": "login",
        "flash": host.take_flashes(&headers),
        "sso": view.map(|Extension(v)| v),
    }))
}

async fn local_login() -> Problem {
    Problem::new(
        StatusCode::NOT_IMPLEMENTED,
        "Not Implemented",
        "The demo host has no local passwords; log in through single sign-on.",
    )
}

async fn logout(State(host): State<Arc<DemoHost>>, headers: HeaderMap) -> Response {
    if let Some(token) = DemoHost::session_token(&headers) {
        host.sessions.remove(&token);
        host.flashes.remove(&token);
    }
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_owned()),
            (
                header::SET_COOKIE,
                format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"),
            ),
        ],
    )
        .into_response()
}

async fn home(State(host): State<Arc<DemoHost>>, headers: HeaderMap) -> Json<serde_json::Value> {
    Json(json!({
        "page": "home",
        "account": host.current_account(&headers),
        "flash": host.take_flashes(&headers),
    }))
}

async fn browse(State(host): State<Arc<DemoHost>>, headers: HeaderMap) -> Json<serde_json::Value> {
    let mut accounts: Vec<LocalAccount> = host.accounts.all();
    accounts.sort_by(|a, b| a.username.cmp(&b.username));
    Json(json!({
        "page": "browse",
        "accounts": accounts,
        "flash": host.take_flashes(&headers),
    }))
}

/// Whether `headers` carry a signed-in host session.
#[must_use]
pub fn is_signed_in(host: &DemoHost, headers: &HeaderMap) -> bool {
    host.current_account(headers).is_some()
}
