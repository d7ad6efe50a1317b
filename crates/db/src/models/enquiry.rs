//! Enquiry entity model and DTOs.

use ott_core::repository::{Entity, FileSlot, MediaKind};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `enquiries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: DbId,
    pub enquiry: Option<String>,
    pub phone_number: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiry {
    pub enquiry: Option<String>,
    pub phone_number: String,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnquiry {
    pub enquiry: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

pub static ENQUIRY_SCHEMA: Schema = Schema::new(
    "Enquiry",
    &[
        FieldRule::optional("enquiry", FieldKind::Text),
        FieldRule::required("phoneNumber", FieldKind::Text).checks(&[Check::Phone]),
        FieldRule::optional("image", FieldKind::Text),
        FieldRule::optional("images", FieldKind::TextList),
        FieldRule::optional("status", FieldKind::Text),
        FieldRule::optional("remarks", FieldKind::Text),
    ],
);

impl Entity for Enquiry {
    type Create = CreateEnquiry;
    type Update = UpdateEnquiry;

    const NAME: &'static str = "Enquiry";
    const LABEL: &'static str = "Enquiry";
    const PLURAL: &'static str = "Enquiries";
    const COUNT_KEY: &'static str = "totalEnquiries";
    const FILE_SLOTS: &'static [FileSlot] = &[
        FileSlot::single("image", "image", MediaKind::Image),
        FileSlot::many("images", "images", MediaKind::Image),
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["enquiry", "phoneNumber", "remarks"];
    const FILTER_FIELDS: &'static [&'static str] = &["status"];

    fn schema() -> &'static Schema {
        &ENQUIRY_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        self.image.iter().chain(self.images.iter()).cloned().collect()
    }
}
