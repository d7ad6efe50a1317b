//! Generic handlers shared by every content resource.
//!
//! Each handler is instantiated per entity in `routes`, e.g.
//! `get(crud::list::<Movie>)`. Mutations run through the entity's
//! [`Pipeline`](ott_core::pipeline::Pipeline), so uploads are committed or
//! rolled back with the write.

use axum::extract::{Query, State};
use axum::Json;
use ott_core::pagination::ListPage;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{all_query, list_query, EntityId, QueryParams};
use crate::resource::Resource;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::Submission;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/{resource}
pub async fn list<E: Resource>(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> AppResult<ApiResponse<ListPage<E>>> {
    let query = list_query::<E>(&params)?;
    let page = E::pipeline(&state).list(&query).await?;
    Ok(ApiResponse::ok(
        format!("{} retrieved successfully", E::PLURAL),
        page,
    ))
}

/// GET /api/v1/{resource}, admin only.
pub async fn list_admin<E: Resource>(
    _admin: RequireAdmin,
    state: State<AppState>,
    params: Query<QueryParams>,
) -> AppResult<ApiResponse<ListPage<E>>> {
    list::<E>(state, params).await
}

/// GET /api/v1/{resource}/all
///
/// Every matching record as a plain JSON array.
pub async fn list_all<E: Resource>(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<E>>> {
    let query = all_query::<E>(&params)?;
    let items = E::pipeline(&state).list_all(query).await?;
    Ok(Json(items))
}

/// GET /api/v1/{resource}/all, admin only.
pub async fn list_all_admin<E: Resource>(
    _admin: RequireAdmin,
    state: State<AppState>,
    params: Query<QueryParams>,
) -> AppResult<Json<Vec<E>>> {
    list_all::<E>(state, params).await
}

/// GET /api/v1/{resource}/{id}
pub async fn get_by_id<E: Resource>(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<E>> {
    let record = E::pipeline(&state).get(id).await?;
    Ok(ApiResponse::ok(
        format!("{} found successfully", E::LABEL),
        record,
    ))
}

/// GET /api/v1/{resource}/{id}, admin only.
pub async fn get_by_id_admin<E: Resource>(
    _admin: RequireAdmin,
    state: State<AppState>,
    id: EntityId,
) -> AppResult<ApiResponse<E>> {
    get_by_id::<E>(state, id).await
}

// ---------------------------------------------------------------------------
// Mutations (admin only)
// ---------------------------------------------------------------------------

/// POST /api/v1/{resource}
pub async fn create<E: Resource>(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    submission: Submission<E>,
) -> AppResult<ApiResponse<E>> {
    tracing::debug!(admin_id = admin.user_id, entity = E::NAME, "Create requested");
    create_record(&state, submission).await
}

/// PUT /api/v1/{resource}/{id}
pub async fn update<E: Resource>(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    EntityId(id): EntityId,
    submission: Submission<E>,
) -> AppResult<ApiResponse<E>> {
    tracing::debug!(admin_id = admin.user_id, entity = E::NAME, id, "Update requested");
    let record = E::pipeline(&state)
        .update(id, submission.payload, submission.tracker)
        .await?;
    Ok(ApiResponse::ok(
        format!("{} updated successfully", E::LABEL),
        record,
    ))
}

/// DELETE /api/v1/{resource}/{id}
pub async fn delete<E: Resource>(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<ApiResponse<()>> {
    tracing::debug!(admin_id = admin.user_id, entity = E::NAME, id, "Delete requested");
    E::pipeline(&state).delete(id).await?;
    Ok(ApiResponse::message(format!(
        "{} deleted successfully",
        E::LABEL
    )))
}

/// Run a create through the pipeline and wrap the result.
pub(crate) async fn create_record<E: Resource>(
    state: &AppState,
    submission: Submission<E>,
) -> AppResult<ApiResponse<E>> {
    let record = E::pipeline(state)
        .create(submission.payload, submission.tracker)
        .await?;
    Ok(ApiResponse::created(
        format!("{} created successfully", E::LABEL),
        record,
    ))
}
