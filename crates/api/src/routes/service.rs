//! Route definitions for the `/services` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::service::Service;

use crate::handlers::crud;
use crate::state::AppState;

/// Routes mounted at `/services`.
///
/// ```text
/// GET    /                                  -> list (public)
/// POST   /                                  -> create (admin)
/// GET    /all                               -> list_all (public)
/// GET    /{id}                              -> get_by_id (public)
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Service>).post(crud::create::<Service>))
        .route("/all", get(crud::list_all::<Service>))
        .route(
            "/{id}",
            get(crud::get_by_id::<Service>)
                .put(crud::update::<Service>)
                .delete(crud::delete::<Service>),
        )
}
