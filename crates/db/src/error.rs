//! Translation of sqlx errors into [`CoreError`].
//!
//! Lives here rather than in the API so the Postgres repositories report
//! the same error kinds as the memory store.

use ott_core::error::CoreError;
use ott_core::repository::Entity;

/// PostgreSQL SQLSTATE codes we distinguish.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Classify a sqlx error raised while operating on `E`.
///
/// - `RowNotFound` -> `NoResults`
/// - unique violation -> `Conflict` naming the duplicated column
/// - foreign key violation on one of `E`'s own references -> `Reference`;
///   on a row pointing at `E` (delete of a referenced row) -> `Conflict`
/// - check violation -> `Validation`
/// - anything else -> `Internal` with the detail logged, not returned
pub fn classify<E: Entity>(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::RowNotFound => CoreError::NoResults(format!("{} not found", E::LABEL)),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => CoreError::Conflict(duplicate_message(
                    E::LABEL,
                    unique_column(constraint).unwrap_or("value"),
                )),
                Some(FOREIGN_KEY_VIOLATION) => {
                    let own = E::REFERENCES
                        .iter()
                        .find(|r| constraint.contains(&column_name(r.field)));
                    match own {
                        Some(reference) => CoreError::Reference(reference.missing_message()),
                        None => CoreError::Conflict(in_use_message(E::LABEL)),
                    }
                }
                Some(CHECK_VIOLATION) => CoreError::Validation(format!(
                    "{} violates constraint \"{constraint}\"",
                    E::LABEL
                )),
                _ => internal(&err),
            }
        }
        _ => internal(&err),
    }
}

fn internal(err: &sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("Database operation failed".into())
}

/// `users_email_key` -> `email`.
fn unique_column(constraint: &str) -> Option<&str> {
    let trimmed = constraint.strip_suffix("_key")?;
    trimmed.split_once('_').map(|(_, column)| column)
}

/// Conflict message shared with the memory store.
pub fn duplicate_message(label: &str, field: &str) -> String {
    format!("{label} with this {field} already exists")
}

/// Conflict message for deleting a row other rows still reference.
pub fn in_use_message(label: &str) -> String {
    format!("{label} is still referenced by other records")
}

/// `categoryId` -> `category_id`.
pub fn column_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
