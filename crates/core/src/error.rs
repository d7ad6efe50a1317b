use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A list query matched nothing. Surfaced as 404 like a missing entity.
    #[error("{0}")]
    NoResults(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A single payload field failed its schema rule.
    #[error("Validation failed on '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// A foreign key points at a row that does not exist.
    #[error("Reference error: {0}")]
    Reference(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a field-level validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
