#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the assembled demo host.

use std::collections::BTreeMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use saml_sso::SamlSsoConfig;
use saml_sso::domain::settings::keys;
use saml_sso_sdk::IdentityAssertion;
use saml_sso_server::config::{AccountSeed, ServerConfig};
use saml_sso_server::host::SESSION_COOKIE;
use saml_sso_server::server;
use serde_json::Value;
use static_idp_plugin::{SessionFixture, StaticIdpPluginConfig};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

fn config(install_dir: &TempDir) -> ServerConfig {
    let mut options = BTreeMap::new();
    options.insert(
        keys::PATH.to_owned(),
        install_dir.path().display().to_string(),
    );
    options.insert(keys::AUTH_SOURCE.to_owned(), "default-sp".to_owned());

    ServerConfig {
        saml_sso: SamlSsoConfig {
            public_base_url: Some(Url::parse("https://site.example.edu/").unwrap()),
            ..SamlSsoConfig::default()
        },
        static_idp: StaticIdpPluginConfig {
            sessions: vec![SessionFixture {
                session_id: "s1".to_owned(),
                auth_source: None,
                attributes: IdentityAssertion::new().with("uid", vec!["jdoe".to_owned()]),
            }],
            ..StaticIdpPluginConfig::default()
        },
        options,
        accounts: vec![AccountSeed {
            username: "jdoe".to_owned(),
            email: "jdoe@example.edu".to_owned(),
            active: true,
        }],
        ..ServerConfig::default()
    }
}

async fn send(router: &Router, path: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(req.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn host_cookie(resp: &Response<Body>) -> String {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_owned()
}

async fn json(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn seeded_options_survive_install() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::build(&config(&dir)).await.unwrap();

    let active = app.sso.service().settings().current();
    assert_eq!(active.settings.auth_source, "default-sp");
    assert_eq!(active.settings.attribute, "uid");
    assert!(active.client().is_some());
}

#[tokio::test]
async fn anonymous_login_page_offers_sso_button() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::build(&config(&dir)).await.unwrap();

    let resp = send(&app.router, "/users/login", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    assert_eq!(body["page"], "login");
    assert!(
        body["sso"]["login_url"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8080/idp/login")
    );
}

#[tokio::test]
async fn provider_session_signs_in_and_unlocks_admin_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::build(&config(&dir)).await.unwrap();

    let resp = send(&app.router, "/users/login", Some("idp_session=s1")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let cookie = host_cookie(&resp);

    let home = json(send(&app.router, "/", Some(&cookie)).await).await;
    assert_eq!(home["account"]["username"], "jdoe");

    let resp = send(&app.router, "/saml-sso/v1/config", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["connected"], true);
}

#[tokio::test]
async fn admin_routes_redirect_anonymous_visitors() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::build(&config(&dir)).await.unwrap();

    for path in ["/saml-sso/v1/config", "/users/add", "/users/browse"] {
        let resp = send(&app.router, path, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/users/login");
    }

    let resp = send(&app.router, "/healthz", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_identity_stays_on_login_page_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    cfg.accounts.clear();
    let app = server::build(&cfg).await.unwrap();

    let resp = send(&app.router, "/users/login", Some("idp_session=s1")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    let messages = body["sso"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["level"], "error");
}
