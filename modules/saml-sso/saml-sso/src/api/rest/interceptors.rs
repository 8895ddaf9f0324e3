//! Middleware wrapping the host's login and logout handlers.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use saml_sso_sdk::SsoSessionId;
use url::Url;

use super::dto::LoginView;
use super::error::domain_error_to_problem;
use super::problem::Problem;
use crate::config::SamlSsoConfig;
use crate::domain::{DomainError, LoginDecision, SsoService};
use crate::host::SignInGrant;

/// Form field posted by the host's local login button.
const LOCAL_SUBMIT_FIELD: &str = "submit";

/// SSO login in front of the host's `/users/login` handler.
pub async fn login_interceptor(
    State(svc): State<Arc<SsoService>>,
    req: Request,
    next: Next,
) -> Response {
    let (mut req, local) = match detect_local_login(req, svc.config().form_body_limit_bytes).await
    {
        Ok(detected) => detected,
        Err(problem) => return problem.into_response(),
    };
    if local {
        tracing::debug!("local login submitted; skipping SSO");
        return next.run(req).await;
    }

    let Some(cookie_name) = svc.session_cookie_name() else {
        return next.run(req).await;
    };
    let session = read_cookie(req.headers(), &cookie_name).map(SsoSessionId::new);

    let return_to = match request_url(svc.config(), &req) {
        Ok(url) => url,
        Err(e) => return domain_error_to_problem(e).into_response(),
    };

    let decision = svc
        .attempt_login(req.headers(), session.as_ref(), &return_to)
        .await;
    match decision {
        Ok(LoginDecision::PassThrough) => next.run(req).await,
        Ok(LoginDecision::SignedIn(grant)) => signed_in(grant),
        Ok(LoginDecision::RedirectToProvider(url)) => see_other(url.as_str()),
        Ok(LoginDecision::ShowLogin(prompt)) => {
            req.extensions_mut().insert(LoginView::from(prompt));
            next.run(req).await
        }
        Err(e) => {
            tracing::error!(error = %e, "SSO login attempt failed; falling back to local login");
            req.extensions_mut()
                .insert(LoginView::from(svc.unavailable_prompt()));
            next.run(req).await
        }
    }
}

/// Provider single logout after the host's `/users/logout` handler.
///
/// The host response is kept (cookie clearing included); only its status and
/// `Location` are replaced when the provider session must be ended.
pub async fn logout_interceptor(
    State(svc): State<Arc<SsoService>>,
    req: Request,
    next: Next,
) -> Response {
    let session = svc
        .session_cookie_name()
        .and_then(|name| read_cookie(req.headers(), &name))
        .map(SsoSessionId::new);
    let base = site_base(svc.config(), req.headers(), req.uri());

    let mut response = next.run(req).await;

    let base = match base {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!(error = %e, "cannot build logout target; keeping host response");
            return response;
        }
    };

    match svc.logout_redirect(session.as_ref(), &base).await {
        Ok(Some(url)) => match HeaderValue::from_str(url.as_str()) {
            Ok(location) => {
                *response.status_mut() = StatusCode::SEE_OTHER;
                response.headers_mut().insert(header::LOCATION, location);
            }
            Err(e) => tracing::error!(error = %e, "provider logout URL is not a valid header"),
        },
        Ok(None) => {}
        Err(e) => tracing::error!(error = %e, "SSO logout failed; keeping host response"),
    }
    response
}

/// Buffer a POST body and report whether it is a local login submission.
async fn detect_local_login(req: Request, limit: usize) -> Result<(Request, bool), Problem> {
    if req.method() != Method::POST {
        return Ok((req, false));
    }

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!(error = %e, "login form body rejected");
        Problem::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload Too Large",
            "The login form could not be read",
        )
    })?;

    let local = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes).is_ok_and(|pairs| {
        pairs
            .iter()
            .any(|(k, v)| k == LOCAL_SUBMIT_FIELD && !v.is_empty())
    });

    Ok((Request::from_parts(parts, Body::from(bytes)), local))
}

fn signed_in(grant: SignInGrant) -> Response {
    let mut response = see_other(&grant.redirect_to);
    for cookie in grant.set_cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

pub(crate) fn see_other(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response(),
        Err(e) => domain_error_to_problem(DomainError::internal(format!(
            "redirect target is not a valid header value: {e}"
        )))
        .into_response(),
    }
}

/// Value of cookie `name`, if present and non-empty.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"').to_owned())
        .filter(|v| !v.is_empty())
}

/// Absolute site root: the configured public URL, else scheme and host from
/// the request.
pub(crate) fn site_base(
    config: &SamlSsoConfig,
    headers: &HeaderMap,
    uri: &axum::http::Uri,
) -> Result<Url, DomainError> {
    if let Some(base) = &config.public_base_url {
        let mut base = base.clone();
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        return Ok(base);
    }

    let host = uri
        .authority()
        .map(|a| a.as_str().to_owned())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        })
        .ok_or_else(|| DomainError::internal("no Host header and no public_base_url configured"))?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    Url::parse(&format!("{scheme}://{host}/"))
        .map_err(|e| DomainError::internal(format!("invalid site URL: {e}")))
}

/// Absolute URL of the current request.
pub(crate) fn request_url(config: &SamlSsoConfig, req: &Request) -> Result<Url, DomainError> {
    let base = site_base(config, req.headers(), req.uri())?;
    let target = req
        .uri()
        .path_and_query()
        .map_or("/", axum::http::uri::PathAndQuery::as_str);
    base.join(target.trim_start_matches('/'))
        .map_err(|e| DomainError::internal(format!("invalid request URL: {e}")))
}
