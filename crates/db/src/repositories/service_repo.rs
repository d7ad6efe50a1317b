//! Repository for the `services` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::Table;
use crate::error::classify;
use crate::models::service::{CreateService, Service, UpdateService};

const TABLE: Table = Table {
    name: "services",
    columns: "id, name, description, image, amount, discount, fasting_time, result_duration, \
              sample_type, age_group, home_sample_collection, created_at, updated_at",
};

/// Provides CRUD operations for services.
pub struct ServiceRepo {
    pool: PgPool,
}

impl ServiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Service> for ServiceRepo {
    async fn create(&self, input: &CreateService) -> Result<Service, CoreError> {
        let query = format!(
            "INSERT INTO services
                (name, description, image, amount, discount, fasting_time, result_duration,
                 sample_type, age_group, home_sample_collection)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.amount)
            .bind(input.discount)
            .bind(&input.fasting_time)
            .bind(&input.result_duration)
            .bind(&input.sample_type)
            .bind(&input.age_group)
            .bind(&input.home_sample_collection)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Service>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Service, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Service>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    /// `services_discount_check` re-validates the discount against the
    /// resulting amount, so a patch touching only one of them is still safe.
    async fn update(
        &self,
        id: DbId,
        input: &UpdateService,
    ) -> Result<Revision<Service>, CoreError> {
        let query = format!(
            "UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                amount = COALESCE($5, amount),
                discount = COALESCE($6, discount),
                fasting_time = COALESCE($7, fasting_time),
                result_duration = COALESCE($8, result_duration),
                sample_type = COALESCE($9, sample_type),
                age_group = COALESCE($10, age_group),
                home_sample_collection = COALESCE($11, home_sample_collection),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Service>)?;
        let previous = TABLE.lock::<Service>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image)
            .bind(input.amount)
            .bind(input.discount)
            .bind(&input.fasting_time)
            .bind(&input.result_duration)
            .bind(&input.sample_type)
            .bind(&input.age_group)
            .bind(&input.home_sample_collection)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Service>)?;
        tx.commit().await.map_err(classify::<Service>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Service, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Service>(&self.pool).await
    }
}
