//! Handlers for user authentication.

use axum::body::Bytes;
use axum::extract::State;
use ott_core::enums::UserStatus;
use ott_core::error::CoreError;
use ott_core::password::verify_password;
use ott_core::roles::ROLE_USER;
use serde::Serialize;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::handlers::admin::{AccountInfo, LoginRequest};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserLoginResponse {
    pub user: AccountInfo,
    pub token: String,
}

/// POST /api/v1/users/login
///
/// Blocked and inactive accounts are refused with 403 even when the
/// password matches.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<ApiResponse<UserLoginResponse>> {
    let input = LoginRequest::parse(&body)?;

    let user = state
        .datastore
        .user_accounts
        .find_credentials(&input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "No user found with entered email".into(),
            ))
        })?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid password entered".into(),
        )));
    }

    match user.status {
        Some(UserStatus::Blocked) => {
            tracing::info!(user_id = user.id, "Login refused: account blocked");
            return Err(AppError::Core(CoreError::Forbidden(
                "Your account has been blocked".into(),
            )));
        }
        Some(UserStatus::Inactive) => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Your account is inactive".into(),
            )));
        }
        Some(UserStatus::Active) | None => {}
    }

    let token = generate_access_token(user.id, ROLE_USER, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(ApiResponse::ok(
        "Login successful",
        UserLoginResponse {
            user: AccountInfo {
                id: user.id,
                email: user.email,
            },
            token,
        },
    ))
}
