//! Route definitions for the `/enquiries` resource.

use axum::routing::get;
use axum::Router;
use ott_db::models::enquiry::Enquiry;

use crate::handlers::{crud, enquiry};
use crate::state::AppState;

/// Routes mounted at `/enquiries`. Submissions take multipart fields
/// `image` and `images[]`.
///
/// ```text
/// POST   /                                  -> submit (public)
/// GET    /                                  -> list (admin)
/// GET    /all                               -> list_all (admin)
/// GET    /{id}                              -> get_by_id (admin)
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(crud::list_admin::<Enquiry>).post(enquiry::submit),
        )
        .route("/all", get(crud::list_all_admin::<Enquiry>))
        .route(
            "/{id}",
            get(crud::get_by_id_admin::<Enquiry>)
                .put(crud::update::<Enquiry>)
                .delete(crud::delete::<Enquiry>),
        )
}
