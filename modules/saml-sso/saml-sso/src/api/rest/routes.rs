use std::sync::Arc;

use axum::http::Method;
use axum::routing::{MethodRouter, get};
use axum::{Extension, Router, middleware};

use super::handlers;
use super::interceptors::{login_interceptor, logout_interceptor};
use crate::domain::SsoService;

pub const LOGIN_PATH: &str = "/users/login";
pub const LOGOUT_PATH: &str = "/users/logout";
pub const ADD_USER_PATH: &str = "/users/add";
pub const CONFIG_PATH: &str = "/saml-sso/v1/config";
pub const CONFIG_FORM_PATH: &str = "/saml-sso/v1/config/form";
pub const LOGIN_URL_PATH: &str = "/saml-sso/v1/login-url";

/// The host's own login and logout handlers, wrapped by the module.
pub struct HostRoutes {
    pub login: MethodRouter,
    pub logout: MethodRouter,
}

/// Mount the module's routes on `router`.
///
/// Only the routes listed here see the module's state; the rest of the host
/// router is untouched.
#[must_use]
pub fn register_routes(router: Router, svc: Arc<SsoService>, host: HostRoutes) -> Router {
    let login = host
        .login
        .layer(middleware::from_fn_with_state(svc.clone(), login_interceptor));
    let logout = host
        .logout
        .layer(middleware::from_fn_with_state(svc.clone(), logout_interceptor));

    let module_routes = Router::new()
        .route(
            ADD_USER_PATH,
            get(handlers::add_user_form).post(handlers::add_user),
        )
        .route(
            CONFIG_PATH,
            get(handlers::get_settings).post(handlers::save_settings),
        )
        .route(CONFIG_FORM_PATH, get(handlers::get_settings_form))
        .route(LOGIN_URL_PATH, get(handlers::get_login_url))
        .layer(Extension(svc));

    router
        .route(LOGIN_PATH, login)
        .route(LOGOUT_PATH, logout)
        .merge(module_routes)
}

/// Routes a host gateway must serve without its own login requirement.
#[must_use]
pub fn public_routes() -> Vec<(Method, &'static str)> {
    vec![(Method::GET, LOGIN_PATH), (Method::POST, LOGIN_PATH)]
}
