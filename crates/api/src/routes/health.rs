//! Liveness endpoint for load balancers and container orchestration.
//!
//! Served at the root, outside `/api/v1`, and without authentication.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the catalog store cannot be reached.
    pub status: &'static str,
    /// Version of the `ott-api` build answering the request.
    pub version: &'static str,
    /// Whether the Postgres pool answered; always true on the memory store.
    pub db_healthy: bool,
}

/// GET /health
///
/// Answers 200 even while Postgres is down; the body then reports
/// `degraded`.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.datastore.health_check().await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
