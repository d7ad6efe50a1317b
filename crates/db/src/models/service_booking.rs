//! Service booking entity model and DTOs.

use chrono::NaiveDate;
use ott_core::enums::{BookingStatus, PaymentType};
use ott_core::repository::{Entity, Reference};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, DefaultValue, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `service_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBooking {
    pub id: DbId,
    pub patient_name: String,
    pub mobile_number: String,
    pub preference: String,
    pub address: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    #[sqlx(try_from = "String")]
    pub payment_type: PaymentType,
    pub total_price: f64,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub service_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceBooking {
    pub patient_name: String,
    pub mobile_number: String,
    pub preference: String,
    pub address: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub payment_type: PaymentType,
    pub total_price: f64,
    pub status: BookingStatus,
    pub service_id: DbId,
    pub user_id: DbId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceBooking {
    pub patient_name: Option<String>,
    pub mobile_number: Option<String>,
    pub preference: Option<String>,
    pub address: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
    pub service_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

/// `userId` is filled from the authenticated user, never from the body.
pub static SERVICE_BOOKING_SCHEMA: Schema = Schema::new(
    "ServiceBooking",
    &[
        FieldRule::required("patientName", FieldKind::Text),
        FieldRule::required("mobileNumber", FieldKind::Text).checks(&[Check::Phone]),
        FieldRule::required("preference", FieldKind::Text),
        FieldRule::optional("address", FieldKind::Text),
        FieldRule::required("date", FieldKind::Date),
        FieldRule::required("time", FieldKind::Text),
        FieldRule::required("paymentType", FieldKind::Text)
            .checks(&[Check::OneOf(PaymentType::VALUES)]),
        FieldRule::required("totalPrice", FieldKind::Number).checks(&[Check::Positive]),
        FieldRule::optional("status", FieldKind::Text)
            .checks(&[Check::OneOf(BookingStatus::VALUES)])
            .default_to(DefaultValue::Text("PENDING")),
        FieldRule::required("serviceId", FieldKind::Id),
        FieldRule::required("userId", FieldKind::Id),
    ],
);

/// Schema of the status-only patch.
pub static BOOKING_STATUS_SCHEMA: Schema = Schema::new(
    "ServiceBookingStatus",
    &[FieldRule::required("status", FieldKind::Text).checks(&[Check::OneOf(BookingStatus::VALUES)])],
);

impl Entity for ServiceBooking {
    type Create = CreateServiceBooking;
    type Update = UpdateServiceBooking;

    const NAME: &'static str = "ServiceBooking";
    const LABEL: &'static str = "Service booking";
    const PLURAL: &'static str = "Service bookings";
    const COUNT_KEY: &'static str = "totalServiceBookings";
    const SEARCH_FIELDS: &'static [&'static str] = &["patientName", "mobileNumber"];
    const FILTER_FIELDS: &'static [&'static str] = &["status", "paymentType", "serviceId", "userId"];
    const REFERENCES: &'static [Reference] = &[
        Reference {
            field: "serviceId",
            entity: "Service",
            table: "services",
        },
        Reference {
            field: "userId",
            entity: "User",
            table: "users",
        },
    ];

    fn schema() -> &'static Schema {
        &SERVICE_BOOKING_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }
}

/// Which of a user's bookings to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTab {
    /// Completed bookings.
    History,
    /// Pending or cancelled bookings.
    Booked,
    All,
}

impl BookingTab {
    pub fn parse(tab: Option<&str>) -> Self {
        match tab {
            Some("history") => Self::History,
            Some("booked") => Self::Booked,
            _ => Self::All,
        }
    }

    /// Status values the tab shows; empty means every status.
    pub fn statuses(self) -> &'static [BookingStatus] {
        match self {
            Self::History => &[BookingStatus::Completed],
            Self::Booked => &[BookingStatus::Pending, BookingStatus::Cancelled],
            Self::All => &[],
        }
    }
}
