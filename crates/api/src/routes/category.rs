//! Route definitions for the `/categories` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::category::Category;

use crate::handlers::crud;
use crate::state::AppState;

/// Routes mounted at `/categories`.
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
        .route(
            "/",
            get(crud::list::<Category>).post(crud::create::<Category>),
        )
        .route("/all", get(crud::list_all::<Category>))
        .route(
            "/{id}",
            get(crud::get_by_id::<Category>)
                .put(crud::update::<Category>)
                .delete(crud::delete::<Category>),
        )
}
