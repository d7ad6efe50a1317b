//! Service entity model and DTOs.

use ott_core::repository::{Entity, FileSlot, MediaKind};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `services` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub amount: f64,
    /// Absolute discount, never above `amount`.
    pub discount: Option<f64>,
    pub fasting_time: Option<String>,
    pub result_duration: Option<String>,
    pub sample_type: String,
    pub age_group: String,
    pub home_sample_collection: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub amount: f64,
    pub discount: Option<f64>,
    pub fasting_time: Option<String>,
    pub result_duration: Option<String>,
    pub sample_type: String,
    pub age_group: String,
    pub home_sample_collection: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub amount: Option<f64>,
    pub discount: Option<f64>,
    pub fasting_time: Option<String>,
    pub result_duration: Option<String>,
    pub sample_type: Option<String>,
    pub age_group: Option<String>,
    pub home_sample_collection: Option<String>,
}

pub static SERVICE_SCHEMA: Schema = Schema::new(
    "Service",
    &[
        FieldRule::required("name", FieldKind::Text),
        FieldRule::required("description", FieldKind::Text),
        FieldRule::optional("image", FieldKind::Text),
        FieldRule::required("amount", FieldKind::Number).checks(&[Check::Positive]),
        FieldRule::optional("discount", FieldKind::Number)
            .checks(&[Check::Min(0.0), Check::AtMostField("amount")]),
        FieldRule::optional("fastingTime", FieldKind::Text),
        FieldRule::optional("resultDuration", FieldKind::Text),
        FieldRule::required("sampleType", FieldKind::Text),
        FieldRule::required("ageGroup", FieldKind::Text),
        FieldRule::optional("homeSampleCollection", FieldKind::Text),
    ],
);

impl Service {
    /// Row-level invariant, also enforced by `services_discount_check`.
    pub fn discount_within_amount(&self) -> bool {
        self.discount.is_none_or(|d| d >= 0.0 && d <= self.amount)
    }
}

impl Entity for Service {
    type Create = CreateService;
    type Update = UpdateService;

    const NAME: &'static str = "Service";
    const LABEL: &'static str = "Service";
    const PLURAL: &'static str = "Services";
    const COUNT_KEY: &'static str = "totalServices";
    const FILE_SLOTS: &'static [FileSlot] = &[FileSlot::single("image", "image", MediaKind::Image)];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];

    fn schema() -> &'static Schema {
        &SERVICE_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        self.image.iter().cloned().collect()
    }
}
