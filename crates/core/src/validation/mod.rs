//! Declarative payload validation.
//!
//! Each entity declares a [`Schema`] of [`FieldRule`]s; [`validate`] checks
//! a raw payload against it in create or update [`Mode`] and returns the
//! normalized payload.

pub mod evaluator;
pub mod rules;

pub use evaluator::{validate, Payload};
pub use rules::{Check, DefaultValue, FieldKind, FieldRule, Mode, Presence, Schema};
