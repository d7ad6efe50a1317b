//! Route definitions for the `/banners` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::banner::Banner;

use crate::handlers::crud;
use crate::state::AppState;

/// Routes mounted at `/banners`. Mutations take the multipart field `image`.
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
        .route("/", get(crud::list::<Banner>).post(crud::create::<Banner>))
        .route(
            "/{id}",
            get(crud::get_by_id::<Banner>)
                .put(crud::update::<Banner>)
                .delete(crud::delete::<Banner>),
        )
}
