pub mod admin;
pub mod banner;
pub mod category;
pub mod dashboard;
pub mod enquiry;
pub mod health;
pub mod movie;
pub mod package;
pub mod service;
pub mod service_booking;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/login                         admin login (public)
/// /counts                              dashboard counts (admin)
///
/// /movies, /banners, /packages         list, get (public); create, update, delete (admin)
/// /categories, /services               same, plus /all (public)
/// /users                               login (public); everything else admin
/// /service-bookings                    create, /me (user); everything else admin
/// /enquiries                           create (public); everything else admin
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .merge(dashboard::router())
        .nest("/movies", movie::router())
        .nest("/categories", category::router())
        .nest("/banners", banner::router())
        .nest("/users", user::router())
        .nest("/services", service::router())
        .nest("/packages", package::router())
        .nest("/service-bookings", service_booking::router())
        .nest("/enquiries", enquiry::router())
}
