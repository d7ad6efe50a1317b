//! Repository for the `banners` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::Table;
use crate::error::classify;
use crate::models::banner::{Banner, CreateBanner, UpdateBanner};

const TABLE: Table = Table {
    name: "banners",
    columns: "id, image, active, created_at, updated_at",
};

/// Provides CRUD operations for banners.
pub struct BannerRepo {
    pool: PgPool,
}

impl BannerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Banner> for BannerRepo {
    async fn create(&self, input: &CreateBanner) -> Result<Banner, CoreError> {
        let query = format!(
            "INSERT INTO banners (image, active) VALUES ($1, $2) RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(&input.image)
            .bind(input.active)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Banner>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Banner, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Banner>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    async fn update(&self, id: DbId, input: &UpdateBanner) -> Result<Revision<Banner>, CoreError> {
        let query = format!(
            "UPDATE banners SET
                image = COALESCE($2, image),
                active = COALESCE($3, active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Banner>)?;
        let previous = TABLE.lock::<Banner>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .bind(&input.image)
            .bind(input.active)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Banner>)?;
        tx.commit().await.map_err(classify::<Banner>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Banner, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Banner>(&self.pool).await
    }
}
