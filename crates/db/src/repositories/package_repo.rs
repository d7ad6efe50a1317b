//! Repository for the `packages` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use super::common::{ensure_references, Table};
use crate::error::classify;
use crate::models::package::{CreatePackage, Package, UpdatePackage};

const TABLE: Table = Table {
    name: "packages",
    columns: "id, name, description, price, discount, image, includes, faqs, service_id, \
              created_at, updated_at",
};

/// Provides CRUD operations for packages.
pub struct PackageRepo {
    pool: PgPool,
}

impl PackageRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Package> for PackageRepo {
    async fn create(&self, input: &CreatePackage) -> Result<Package, CoreError> {
        ensure_references::<Package>(&self.pool, input).await?;
        let query = format!(
            "INSERT INTO packages
                (name, description, price, discount, image, includes, faqs, service_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.discount)
            .bind(&input.image)
            .bind(Json(&input.includes))
            .bind(Json(&input.faqs))
            .bind(input.service_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Package>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Package, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Package>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdatePackage,
    ) -> Result<Revision<Package>, CoreError> {
        ensure_references::<Package>(&self.pool, input).await?;
        let query = format!(
            "UPDATE packages SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                discount = COALESCE($5, discount),
                image = COALESCE($6, image),
                includes = COALESCE($7, includes),
                faqs = COALESCE($8, faqs),
                service_id = COALESCE($9, service_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Package>)?;
        let previous = TABLE.lock::<Package>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.discount)
            .bind(&input.image)
            .bind(input.includes.as_ref().map(Json))
            .bind(input.faqs.as_ref().map(Json))
            .bind(input.service_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Package>)?;
        tx.commit().await.map_err(classify::<Package>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Package, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Package>(&self.pool).await
    }
}
