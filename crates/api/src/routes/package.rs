//! Route definitions for the `/packages` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::package::Package;

use crate::handlers::crud;
use crate::state::AppState;

/// Routes mounted at `/packages`. `includes` and `faqs` may be sent as
/// JSON text in multipart bodies.
///
/// ```text
/// GET    /                                  -> list (public, ?serviceId=)
/// POST   /                                  -> create (admin)
/// GET    /{id}                              -> get_by_id (public)
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Package>).post(crud::create::<Package>))
        .route(
            "/{id}",
            get(crud::get_by_id::<Package>)
                .put(crud::update::<Package>)
                .delete(crud::delete::<Package>),
        )
}
