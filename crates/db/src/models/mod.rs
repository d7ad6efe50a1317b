//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO built from a validated payload
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - The validation schema and the [`Entity`](ott_core::repository::Entity)
//!   metadata tying them together

pub mod admin;
pub mod banner;
pub mod category;
pub mod enquiry;
pub mod movie;
pub mod package;
pub mod service;
pub mod service_booking;
pub mod user;
