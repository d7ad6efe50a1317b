//! The response envelope every endpoint returns.
//!
//! `{ "status": 200, "success": true, "message": "...", "data": ... }`,
//! where `data` is a record, a list page or `null`. Errors use the same
//! shape (see [`crate::error`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            success: status.is_success(),
            message: message.into(),
            data,
        }
    }

    /// 200 with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    /// 201 with the created record.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_follows_status() {
        let created = ApiResponse::created("Movie created successfully", 1);
        assert_eq!(created.status, 201);
        assert!(created.success);

        let missing = ApiResponse::<()>::new(StatusCode::NOT_FOUND, "Movie not found", None);
        assert!(!missing.success);
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            serde_json::json!({
                "status": 404,
                "success": false,
                "message": "Movie not found",
                "data": null,
            })
        );
    }
}
