//! Banner entity model and DTOs.

use ott_core::repository::{Entity, FileSlot, MediaKind};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, DefaultValue, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `banners` table. `active` is 1 (shown) or 0 (hidden).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: DbId,
    pub image: String,
    pub active: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBanner {
    pub image: String,
    pub active: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBanner {
    pub image: Option<String>,
    pub active: Option<i32>,
}

pub static BANNER_SCHEMA: Schema = Schema::new(
    "Banner",
    &[
        FieldRule::required("image", FieldKind::Text),
        FieldRule::optional("active", FieldKind::Integer)
            .checks(&[Check::Min(0.0), Check::Max(1.0)])
            .default_to(DefaultValue::Integer(1)),
    ],
);

impl Entity for Banner {
    type Create = CreateBanner;
    type Update = UpdateBanner;

    const NAME: &'static str = "Banner";
    const LABEL: &'static str = "Banner";
    const PLURAL: &'static str = "Banners";
    const COUNT_KEY: &'static str = "totalBanners";
    const FILE_SLOTS: &'static [FileSlot] = &[FileSlot::single("image", "image", MediaKind::Image)];
    const FILTER_FIELDS: &'static [&'static str] = &["active"];

    fn schema() -> &'static Schema {
        &BANNER_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        vec![self.image.clone()]
    }
}
