//! Application assembly: stores, module, middleware stack and serving.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use saml_sso::domain::settings::keys;
use saml_sso::infra::{InMemoryAccounts, InMemoryOptionStore};
use saml_sso::{SamlSso, SamlSsoDeps};
use saml_sso_sdk::LocalAccount;
use static_idp_plugin::StaticIdpPlugin;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::host::{DemoHost, is_signed_in};

/// Paths that need a signed-in host session unless listed as public.
const PROTECTED_PREFIXES: &[&str] = &["/saml-sso/", "/users/add", "/users/browse"];

#[derive(Clone)]
struct GuardState {
    host: Arc<DemoHost>,
    public: Arc<Vec<(Method, &'static str)>>,
}

/// Built application plus handles used by tests.
pub struct App {
    pub router: Router,
    pub sso: Arc<SamlSso>,
    pub accounts: Arc<InMemoryAccounts>,
    pub plugin: Arc<StaticIdpPlugin>,
}

/// Wire stores, plugin, host and module into a router.
///
/// # Errors
///
/// Fails if the plugin config is invalid or the module cannot load its
/// options.
pub async fn build(cfg: &ServerConfig) -> anyhow::Result<App> {
    let accounts = Arc::new(InMemoryAccounts::new());
    for seed in &cfg.accounts {
        accounts.insert(LocalAccount {
            id: Uuid::new_v4(),
            username: seed.username.clone(),
            email: seed.email.clone(),
            active: seed.active,
        });
    }

    let options = Arc::new(InMemoryOptionStore::with_values(
        keys::DEFAULTS
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .chain(cfg.options.clone()),
    ));
    let plugin = Arc::new(
        StaticIdpPlugin::new(cfg.static_idp.clone())
            .context("invalid static identity-provider config")?,
    );
    let host = Arc::new(DemoHost::new(accounts.clone()));

    let sso = Arc::new(SamlSso::new(
        cfg.saml_sso.clone(),
        SamlSsoDeps {
            options,
            plugin: plugin.clone(),
            accounts: accounts.clone(),
            registry: accounts.clone(),
            session: host.clone(),
        },
    ));
    sso.init().await.context("failed to initialize SAML SSO module")?;

    let guard = GuardState {
        host: host.clone(),
        public: Arc::new(sso.public_routes()),
    };

    let router = sso
        .register_rest(host.pages(), host.auth_routes())
        .layer(middleware::from_fn_with_state(guard, require_session))
        .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(cfg.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http());

    Ok(App {
        router,
        sso,
        accounts,
        plugin,
    })
}

/// Send visitors without a host session to the login page for protected paths.
async fn require_session(State(guard): State<GuardState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let public = guard
        .public
        .iter()
        .any(|(method, route)| method == req.method() && *route == path);
    let protected = PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p));

    if public || !protected || is_signed_in(&guard.host, req.headers()) {
        return next.run(req).await;
    }

    tracing::debug!(path, "redirecting anonymous visitor to login");
    Redirect::to("/users/login").into_response()
}

/// Bind and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Fails if the address is invalid, the socket cannot be bound, or the
/// server stops with an error.
pub async fn serve(cfg: &ServerConfig, router: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", cfg.bind_addr))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
