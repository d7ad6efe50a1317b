//! Repository for the `users` table.

use async_trait::async_trait;
use ott_core::enums::UserStatus;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{AccountRepository, Credentials, Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::Table;
use crate::error::classify;
use crate::models::user::{CreateUser, UpdateUser, User};

const TABLE: Table = Table {
    name: "users",
    columns: "id, name, email, password_hash, status, image, created_at, updated_at",
};

/// Provides CRUD operations and credential lookup for users.
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for UserRepo {
    async fn create(&self, input: &CreateUser) -> Result<User, CoreError> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, status, image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.status.as_str())
            .bind(&input.image)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<User>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<User, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<User>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    async fn update(&self, id: DbId, input: &UpdateUser) -> Result<Revision<User>, CoreError> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                status = COALESCE($5, status),
                image = COALESCE($6, image),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<User>)?;
        let previous = TABLE.lock::<User>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.status.map(UserStatus::as_str))
            .bind(&input.image)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<User>)?;
        tx.commit().await.map_err(classify::<User>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<User, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<User>(&self.pool).await
    }
}

#[async_trait]
impl AccountRepository for UserRepo {
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", TABLE.columns);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify::<User>)?;
        Ok(user.map(|u| Credentials {
            id: u.id,
            email: u.email,
            password_hash: u.password_hash,
            status: Some(u.status),
        }))
    }
}
