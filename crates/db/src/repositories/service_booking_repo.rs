//! Repository for the `service_bookings` table.

use async_trait::async_trait;
use ott_core::enums::{BookingStatus, PaymentType};
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use sqlx::PgPool;

use super::common::{ensure_references, Table};
use crate::error::classify;
use crate::models::service_booking::{
    CreateServiceBooking, ServiceBooking, UpdateServiceBooking,
};

const TABLE: Table = Table {
    name: "service_bookings",
    columns: "id, patient_name, mobile_number, preference, address, date, time, payment_type, \
              total_price, status, service_id, user_id, created_at, updated_at",
};

/// Provides CRUD operations for service bookings.
pub struct ServiceBookingRepo {
    pool: PgPool,
}

impl ServiceBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<ServiceBooking> for ServiceBookingRepo {
    async fn create(&self, input: &CreateServiceBooking) -> Result<ServiceBooking, CoreError> {
        ensure_references::<ServiceBooking>(&self.pool, input).await?;
        let query = format!(
            "INSERT INTO service_bookings
                (patient_name, mobile_number, preference, address, date, time, payment_type,
                 total_price, status, service_id, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {}",
            TABLE.columns
        );
        sqlx::query_as::<_, ServiceBooking>(&query)
            .bind(&input.patient_name)
            .bind(&input.mobile_number)
            .bind(&input.preference)
            .bind(&input.address)
            .bind(input.date)
            .bind(&input.time)
            .bind(input.payment_type.as_str())
            .bind(input.total_price)
            .bind(input.status.as_str())
            .bind(input.service_id)
            .bind(input.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify::<ServiceBooking>)
    }

    async fn find_by_id(&self, id: DbId) -> Result<ServiceBooking, CoreError> {
        TABLE.find_by_id(&self.pool, id).await
    }

    async fn find_many(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<ServiceBooking>, i64), CoreError> {
        TABLE.find_many(&self.pool, query).await
    }

    /// Status moves freely between every value.
    async fn update(
        &self,
        id: DbId,
        input: &UpdateServiceBooking,
    ) -> Result<Revision<ServiceBooking>, CoreError> {
        ensure_references::<ServiceBooking>(&self.pool, input).await?;
        let query = format!(
            "UPDATE service_bookings SET
                patient_name = COALESCE($2, patient_name),
                mobile_number = COALESCE($3, mobile_number),
                preference = COALESCE($4, preference),
                address = COALESCE($5, address),
                date = COALESCE($6, date),
                time = COALESCE($7, time),
                payment_type = COALESCE($8, payment_type),
                total_price = COALESCE($9, total_price),
                status = COALESCE($10, status),
                service_id = COALESCE($11, service_id),
                user_id = COALESCE($12, user_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TABLE.columns
        );
        let mut tx = self.pool.begin().await.map_err(classify::<ServiceBooking>)?;
        let previous = TABLE.lock::<ServiceBooking>(&mut *tx, id).await?;
        let current = sqlx::query_as::<_, ServiceBooking>(&query)
            .bind(id)
            .bind(&input.patient_name)
            .bind(&input.mobile_number)
            .bind(&input.preference)
            .bind(&input.address)
            .bind(input.date)
            .bind(&input.time)
            .bind(input.payment_type.map(PaymentType::as_str))
            .bind(input.total_price)
            .bind(input.status.map(BookingStatus::as_str))
            .bind(input.service_id)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify::<ServiceBooking>)?;
        tx.commit().await.map_err(classify::<ServiceBooking>)?;
        Ok(Revision { previous, current })
    }

    async fn delete(&self, id: DbId) -> Result<ServiceBooking, CoreError> {
        TABLE.delete(&self.pool, id).await
    }

    async fn count(&self) -> Result<i64, CoreError> {
        TABLE.count::<ServiceBooking>(&self.pool).await
    }
}
