use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ott_core::error::CoreError;
use serde_json::{json, Value};

use crate::response::ApiResponse;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the standard envelope with
/// `success: false`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `ott_core`, including classified
    /// datastore errors.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed request (unreadable body, bad multipart stream).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An uploaded file exceeded its size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data): (StatusCode, String, Option<Value>) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => {
                    (StatusCode::NOT_FOUND, format!("{entity} not found"), None)
                }
                CoreError::NoResults(msg) => (StatusCode::NOT_FOUND, msg, None),
                CoreError::InvalidField { field, message } => (
                    StatusCode::BAD_REQUEST,
                    message,
                    Some(json!({ "field": field })),
                ),
                CoreError::Validation(msg) | CoreError::Reference(msg) => {
                    (StatusCode::BAD_REQUEST, msg, None)
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.into(), None)
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.into(), None)
            }
        };

        ApiResponse::new(status, message, data).into_response()
    }
}
