//! Route definitions for the `/movies` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::movie::Movie;

use crate::handlers::crud;
use crate::state::AppState;

/// Routes mounted at `/movies`. Mutations take multipart fields `image`
/// and `movie`.
///
/// ```text
/// GET    /                                  -> list (public)
/// POST   /                                  -> create (admin)
/// GET    /{id}                              -> get_by_id (public)
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Movie>).post(crud::create::<Movie>))
        .route(
            "/{id}",
            get(crud::get_by_id::<Movie>)
                .put(crud::update::<Movie>)
                .delete(crud::delete::<Movie>),
        )
}
