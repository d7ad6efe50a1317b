//! Category entity model and DTOs.

use ott_core::repository::{Entity, FileSlot, MediaKind};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

pub static CATEGORY_SCHEMA: Schema = Schema::new(
    "Category",
    &[
        FieldRule::required("name", FieldKind::Text),
        FieldRule::optional("imageUrl", FieldKind::Text),
    ],
);

impl Entity for Category {
    type Create = CreateCategory;
    type Update = UpdateCategory;

    const NAME: &'static str = "Category";
    const LABEL: &'static str = "Category";
    const PLURAL: &'static str = "Categories";
    const COUNT_KEY: &'static str = "totalCategories";
    const FILE_SLOTS: &'static [FileSlot] =
        &[FileSlot::single("image", "imageUrl", MediaKind::Image)];
    const SEARCH_FIELDS: &'static [&'static str] = &["name"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["name"];

    fn schema() -> &'static Schema {
        &CATEGORY_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        self.image_url.iter().cloned().collect()
    }
}
