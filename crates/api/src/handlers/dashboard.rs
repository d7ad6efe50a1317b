//! Handler for the admin dashboard counts.

use axum::extract::State;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Counts {
    pub movies: i64,
    pub categories: i64,
    pub banners: i64,
    pub users: i64,
}

/// GET /api/v1/counts
pub async fn counts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Counts>> {
    let ds = &state.datastore;
    let (movies, categories, banners, users) = tokio::try_join!(
        ds.movies.count(),
        ds.categories.count(),
        ds.banners.count(),
        ds.users.count(),
    )?;
    Ok(ApiResponse::ok(
        "Counts retrieved successfully",
        Counts {
            movies,
            categories,
            banners,
            users,
        },
    ))
}
