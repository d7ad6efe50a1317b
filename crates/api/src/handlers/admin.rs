//! Handlers for admin authentication.

use axum::body::Bytes;
use axum::extract::State;
use ott_core::error::CoreError;
use ott_core::password::verify_password;
use ott_core::roles::ROLE_ADMIN;
use ott_core::types::DbId;
use serde::Serialize;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::json_payload;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Email and password from a login body; both required and non-blank.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        let payload = json_payload(body)?;
        let text = |name: &str| payload.get(name).and_then(|v| v.as_str());
        let email = text("email").map(str::trim).filter(|v| !v.is_empty());
        // Passwords are stored as sent, so only a blank one is rejected.
        let password = text("password").filter(|v| !v.trim().is_empty());
        match (email.map(str::to_owned), password.map(str::to_owned)) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(AppError::Core(CoreError::Validation(
                "Email and password are required".into(),
            ))),
        }
    }
}

/// Account summary returned with a token.
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub id: DbId,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub admin: AccountInfo,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/login
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<ApiResponse<AdminLoginResponse>> {
    let input = LoginRequest::parse(&body)?;

    let admin = state
        .datastore
        .admins
        .find_credentials(&input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "No admin found with entered email".into(),
            ))
        })?;

    if !verify_password(&input.password, &admin.password_hash)? {
        tracing::info!(admin_id = admin.id, "Admin login rejected: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid password entered".into(),
        )));
    }

    let token = generate_access_token(admin.id, ROLE_ADMIN, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(admin_id = admin.id, "Admin logged in");
    Ok(ApiResponse::ok(
        "Login successful",
        AdminLoginResponse {
            admin: AccountInfo {
                id: admin.id,
                email: admin.email,
            },
            token,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_but_password_kept_verbatim() {
        let input =
            LoginRequest::parse(br#"{"email": " asha@example.com ", "password": " pad secret "}"#)
                .unwrap();
        assert_eq!(input.email, "asha@example.com");
        assert_eq!(input.password, " pad secret ");
    }

    #[test]
    fn blank_password_is_rejected() {
        let err = LoginRequest::parse(br#"{"email": "a@example.com", "password": "   "}"#)
            .unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Validation(msg)) if msg == "Email and password are required"));
    }
}
