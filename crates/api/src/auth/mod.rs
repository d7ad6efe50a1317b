//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`bootstrap`] -- Admin account creation at startup.
//!
//! Password hashing lives in `ott_core::password` so the user model can
//! hash on create and update.

pub mod bootstrap;
pub mod jwt;
