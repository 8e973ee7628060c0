//! Unified error handling for Tenantgate Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Gate failures (`Unauthorized`, `Forbidden`) are terminal for the request
/// and surfaced verbatim; collaborator failures are logged and reported as
/// internal errors without their detail.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// A multi-step operation failed after an earlier step took effect.
    /// The message names what was left behind and is returned to the caller.
    #[error("Partial failure: {0}")]
    PartialFailure(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone())
            }
            AppError::IdentityProvider(msg) => {
                tracing::error!("Identity provider error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "identity_provider_error",
                    "Identity provider request failed".to_string(),
                )
            }
            AppError::DocumentStore(msg) => {
                tracing::error!("Document store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "document_store_error",
                    "Document store request failed".to_string(),
                )
            }
            AppError::PartialFailure(msg) => {
                tracing::error!("Partial failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partial_failure",
                    msg.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
