//! Route definitions for the `/service-bookings` resource.

use axum::routing::{get, patch};
use axum::Router;
use ott_db::models::service_booking::ServiceBooking;

use crate::handlers::{crud, service_booking};
use crate::state::AppState;

/// Routes mounted at `/service-bookings`.
///
/// ```text
/// POST   /                                  -> create (user)
/// GET    /me                                -> mine (user, ?tab=history|booked)
/// GET    /                                  -> list (admin)
/// GET    /{id}                              -> get_by_id (admin)
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> delete (admin)
/// PATCH  /{id}/status                       -> update_status (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(crud::list_admin::<ServiceBooking>).post(service_booking::create),
        )
        .route("/me", get(service_booking::mine))
        .route(
            "/{id}",
            get(crud::get_by_id_admin::<ServiceBooking>)
                .put(crud::update::<ServiceBooking>)
                .delete(crud::delete::<ServiceBooking>),
        )
        .route("/{id}/status", patch(service_booking::update_status))
}
