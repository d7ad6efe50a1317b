//! Domain core for the OTT content backend.
//!
//! Everything here is datastore-agnostic: the error taxonomy, the declarative
//! schema validator, the per-request file artifact tracker, list/pagination
//! helpers, the repository and entity traits, and the mutation pipeline that
//! composes them.

pub mod artifacts;
pub mod enums;
pub mod error;
pub mod pagination;
pub mod password;
pub mod pipeline;
pub mod repository;
pub mod roles;
pub mod types;
pub mod validation;
