pub mod admin;
pub mod crud;
pub mod dashboard;
pub mod enquiry;
pub mod service_booking;
pub mod user;

use ott_core::error::CoreError;

use crate::error::AppError;

/// Fallback for unknown routes, in the standard envelope.
pub async fn not_found() -> AppError {
    AppError::Core(CoreError::NoResults("Route not found".into()))
}
