//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;
use ott_db::models::user::User;

use crate::handlers::{crud, user};
use crate::state::AppState;

/// Routes mounted at `/users`. Everything but login requires an admin.
///
/// ```text
/// POST   /login                             -> login (public)
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /all                               -> list_all
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(user::login))
        .route(
            "/",
            get(crud::list_admin::<User>).post(crud::create::<User>),
        )
        .route("/all", get(crud::list_all_admin::<User>))
        .route(
            "/{id}",
            get(crud::get_by_id_admin::<User>)
                .put(crud::update::<User>)
                .delete(crud::delete::<User>),
        )
}
