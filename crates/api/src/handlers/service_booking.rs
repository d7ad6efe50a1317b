//! Service booking handlers that differ from the generic ones: creation by
//! the booking user, the user's own listing and the status patch.

use axum::body::Bytes;
use axum::extract::{Query, State};
use ott_core::error::CoreError;
use ott_core::pagination::ListPage;
use ott_core::repository::Entity;
use ott_core::validation::{validate, Mode};
use ott_db::models::service_booking::{BookingTab, ServiceBooking, BOOKING_STATUS_SCHEMA};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::handlers::crud::create_record;
use crate::middleware::rbac::{RequireAdmin, RequireUser};
use crate::query::{list_query, EntityId, QueryParams};
use crate::resource::Resource;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::{json_payload, Submission};

/// POST /api/v1/service-bookings
///
/// The booking belongs to the authenticated user; a `userId` in the body is
/// overwritten.
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    mut submission: Submission<ServiceBooking>,
) -> AppResult<ApiResponse<ServiceBooking>> {
    submission
        .payload
        .insert("userId".into(), Value::from(user.user_id));
    create_record(&state, submission).await
}

/// GET /api/v1/service-bookings/me?tab=history|booked
///
/// `history` lists completed bookings, `booked` pending and cancelled
/// ones; any other tab lists all of them.
pub async fn mine(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(mut params): Query<QueryParams>,
) -> AppResult<ApiResponse<ListPage<ServiceBooking>>> {
    let tab = BookingTab::parse(params.remove("tab").as_deref());
    params.remove("userId");
    if !tab.statuses().is_empty() {
        params.remove("status");
    }

    let mut query = list_query::<ServiceBooking>(&params)?.with_filter(
        ServiceBooking::FILTER_FIELDS,
        "userId",
        &user.user_id.to_string(),
    )?;
    let statuses: Vec<&str> = tab.statuses().iter().map(|s| s.as_str()).collect();
    if !statuses.is_empty() {
        query = query.with_filter(ServiceBooking::FILTER_FIELDS, "status", &statuses.join(","))?;
    }

    let page = match ServiceBooking::pipeline(&state).list(&query).await {
        Err(CoreError::NoResults(_)) => {
            return Err(AppError::Core(CoreError::NoResults(
                "No service bookings found for this user".into(),
            )))
        }
        other => other?,
    };
    Ok(ApiResponse::ok(
        "User service bookings retrieved successfully",
        page,
    ))
}

/// PATCH /api/v1/service-bookings/{id}/status
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    EntityId(id): EntityId,
    body: Bytes,
) -> AppResult<ApiResponse<ServiceBooking>> {
    let payload = json_payload(&body)?;
    let patch = validate(&BOOKING_STATUS_SCHEMA, &payload, Mode::Create)
        .map_err(|_| AppError::Core(CoreError::Validation("Invalid status".into())))?;

    let pipeline = ServiceBooking::pipeline(&state);
    let booking = pipeline.update(id, patch, pipeline.tracker()).await?;
    tracing::info!(id, status = %booking.status, "Service booking status changed");
    Ok(ApiResponse::ok(
        "Service booking status updated successfully",
        booking,
    ))
}
