//! Admin account model.

use ott_core::repository::Credentials;
use ott_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `admins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: DbId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Admin> for Credentials {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            password_hash: admin.password_hash,
            status: None,
        }
    }
}
