//! Repository for the `admins` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::repository::{AccountRepository, AdminRepository, Credentials};
use sqlx::PgPool;

use crate::models::admin::Admin;

const COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

/// Admin lookup and the idempotent startup bootstrap.
pub struct AdminRepo {
    pool: PgPool,
}

impl AdminRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Admin query failed");
    CoreError::Internal("Database operation failed".into())
}

#[async_trait]
impl AccountRepository for AdminRepo {
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM admins WHERE email = $1");
        let admin = sqlx::query_as::<_, Admin>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(admin.map(Credentials::from))
    }
}

#[async_trait]
impl AdminRepository for AdminRepo {
    async fn ensure(&self, email: &str, password_hash: &str) -> Result<bool, CoreError> {
        let result = sqlx::query(
            "INSERT INTO admins (email, password_hash) VALUES ($1, $2)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }
}
