use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::ledger::LedgerError;

/// Failures of a domain rule, raised by the repository layer
///
/// Repository functions return `anyhow::Result`; these are carried inside
/// the `anyhow::Error` and recovered by `ApiError`'s conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Conflict(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(anyhow::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Missing or unknown user")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(domain) = err.downcast_ref::<DomainError>() {
            return match domain {
                DomainError::NotFound(entity) => ApiError::NotFound(entity),
                DomainError::Invalid(msg) => ApiError::Validation(msg.clone()),
                DomainError::Conflict(msg) => ApiError::Conflict(msg.clone()),
            };
        }
        if let Some(ledger) = err.downcast_ref::<LedgerError>() {
            return ApiError::Validation(ledger.to_string());
        }
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{} not found", entity)),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Missing or unknown user".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
