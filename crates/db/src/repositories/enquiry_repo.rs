//! Repository for the `enquiries` table.

use async_trait::async_trait;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::Table;
use crate::error::classify;
use crate::models::enquiry::{CreateEnquiry, Enquiry, UpdateEnquiry};

const TABLE: Table = Table {
    name: "enquiries",
    columns: "id, enquiry, phone_number, image, images, status, remarks, created_at, updated_at",
};

/// Provides CRUD operations for enquiries.
pub struct EnquiryRepo {
    pool: PgPool,
}

impl EnquiryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Enquiry> for EnquiryRepo {
    async fn create(&self, input: &CreateEnquiry) -> Result<Enquiry, CoreError> {
        let query = format!(
            "INSERT INTO enquiries (enquiry, phone_number, image, images, status, remarks)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(&input.enquiry)
            .bind(&input.phone_number)
            .bind(&input.image)
            .bind(&input.images)
            .bind(&input.status)
            .bind(&input.remarks)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<Enquiry>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Enquiry, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Enquiry>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateEnquiry,
    ) -> Result<Revision<Enquiry>, CoreError> {
        let query = format!(
            "UPDATE enquiries SET
                enquiry = COALESCE($2, enquiry),
                phone_number = COALESCE($3, phone_number),
                image = COALESCE($4, image),
                images = COALESCE($5, images),
                status = COALESCE($6, status),
                remarks = COALESCE($7, remarks),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<Enquiry>)?;
        let previous = TABLE.lock::<Enquiry>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(&input.enquiry)
            .bind(&input.phone_number)
            .bind(&input.image)
            .bind(&input.images)
            .bind(&input.status)
            .bind(&input.remarks)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<Enquiry>)?;
        tx.commit().await.map_err(classify::<Enquiry>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<Enquiry, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<Enquiry>(&self.pool).await
    }
}
