//! Repository for the `categories` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::Table;
use crate::error::classify;
use crate::models::category::{Category, CreateCategory, UpdateCategory};

const TABLE: Table = Table {
    name: "categories",
    columns: "id, name, image_url, created_at, updated_at",
};

/// Provides CRUD operations for categories.
pub struct CategoryRepo {
    pool: PgPool,
}

impl CategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Category> for CategoryRepo {
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError> {
        let query = format!(
            "INSERT INTO categories (name, image_url) VALUES ($1, $2) RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Category>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Category, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Category>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Revision<Category>, CoreError> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                image_url = COALESCE($3, image_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Category>)?;
        let previous = TABLE.lock::<Category>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.image_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Category>)?;
        tx.commit().await.map_err(classify::<Category>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Category, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Category>(&self.pool).await
    }
}
