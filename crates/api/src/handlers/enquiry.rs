//! Enquiries are submitted by anyone; everything else is admin-only and
//! served by the generic handlers.

use axum::extract::State;
use ott_db::models::enquiry::Enquiry;

use crate::error::AppResult;
use crate::handlers::crud::create_record;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::Submission;

/// POST /api/v1/enquiries
pub async fn submit(
    State(state): State<AppState>,
    submission: Submission<Enquiry>,
) -> AppResult<ApiResponse<Enquiry>> {
    create_record(&state, submission).await
}
