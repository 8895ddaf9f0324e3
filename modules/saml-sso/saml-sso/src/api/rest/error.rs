//! Domain error to Problem Details mapping.

use axum::http::StatusCode;

use super::problem::Problem;
use crate::domain::DomainError;
use crate::domain::service::INVALID_FORM_MESSAGE;

/// Map a domain error to a Problem, logging what the client does not see.
#[must_use]
pub fn domain_error_to_problem(e: DomainError) -> Problem {
    match e {
        DomainError::Validation { field, message } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Error",
            format!("{field}: {message}"),
        )
        .with_errors(vec![message]),
        DomainError::InvalidForm { errors } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid Form",
            INVALID_FORM_MESSAGE,
        )
        .with_errors(errors),
        DomainError::Rejected(messages) => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Rejected",
            messages.join(" "),
        )
        .with_errors(messages),
        DomainError::NotConfigured => Problem::new(
            StatusCode::CONFLICT,
            "Not Configured",
            "Single sign-on is not configured",
        ),
        DomainError::Provider(msg) => {
            tracing::error!("identity provider error: {msg}");
            Problem::new(
                StatusCode::BAD_GATEWAY,
                "Bad Gateway",
                "The identity provider could not be reached",
            )
        }
        DomainError::Storage(msg) => {
            tracing::error!("storage error: {msg}");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal storage error occurred",
            )
        }
        DomainError::Session(msg) => {
            tracing::error!("host session error: {msg}");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "The session could not be updated",
            )
        }
        DomainError::Internal(msg) => {
            tracing::error!("internal error: {msg}");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal error occurred",
            )
        }
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(e)
    }
}

pub type ApiResult<T> = Result<T, Problem>;
