use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// `GET /counts` (admin).
pub fn router() -> Router<AppState> {
    Router::new().route("/counts", get(dashboard::counts))
}
