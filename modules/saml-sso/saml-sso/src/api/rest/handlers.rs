use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Form, Query};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};

use super::dto::{AddUserRequest, LoginUrlDto, LoginUrlQuery, SettingsDto, UpdateSettingsRequest};
use super::error::ApiResult;
use super::interceptors::{see_other, site_base};
use super::problem::Problem;
use crate::domain::forms::{self, FormDescriptor};
use crate::domain::{DomainError, SsoService};

/// GET /saml-sso/v1/config
#[tracing::instrument(skip_all)]
pub async fn get_settings(Extension(svc): Extension<Arc<SsoService>>) -> Json<SettingsDto> {
    Json(SettingsDto::from(svc.settings().current().as_ref()))
}

/// GET /saml-sso/v1/config/form
#[tracing::instrument(skip_all)]
pub async fn get_settings_form(
    Extension(svc): Extension<Arc<SsoService>>,
) -> Json<FormDescriptor> {
    Json(svc.settings().form())
}

/// POST /saml-sso/v1/config
#[tracing::instrument(skip_all)]
pub async fn save_settings(
    Extension(svc): Extension<Arc<SsoService>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<SettingsDto>> {
    let active = svc.settings().save(req.into()).await?;
    Ok(Json(SettingsDto::from(active.as_ref())))
}

/// GET /saml-sso/v1/login-url
#[tracing::instrument(skip_all)]
pub async fn get_login_url(
    Extension(svc): Extension<Arc<SsoService>>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<LoginUrlQuery>,
) -> ApiResult<Json<LoginUrlDto>> {
    let base = site_base(svc.config(), &headers, &uri)?;
    let target = query
        .return_to
        .unwrap_or_else(|| svc.config().home_path.clone());
    let return_to = base
        .join(target.trim_start_matches('/'))
        .map_err(|e| DomainError::validation("return_to", e.to_string()))?;

    let login_url = svc.login_url(&return_to).await?;
    Ok(Json(LoginUrlDto {
        login_url: login_url.into(),
    }))
}

/// GET /users/add
pub async fn add_user_form(Extension(svc): Extension<Arc<SsoService>>) -> Json<FormDescriptor> {
    Json(forms::add_user_form(&svc.config().roles))
}

/// POST /users/add
#[tracing::instrument(skip_all)]
pub async fn add_user(
    Extension(svc): Extension<Arc<SsoService>>,
    headers: HeaderMap,
    Form(req): Form<AddUserRequest>,
) -> Response {
    match svc.add_user(&headers, req.into()).await {
        Ok(added) => see_other(&added.redirect_to),
        Err(e) => Problem::from(e).into_response(),
    }
}
