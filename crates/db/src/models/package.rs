//! Package entity model and DTOs.
//!
//! `includes` and `faqs` are ordered lists stored as JSONB.

use ott_core::repository::{Entity, FileSlot, MediaKind, Reference};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One section of what a package includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInclude {
    pub title: String,
    pub description: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageFaq {
    pub question: String,
    pub answer: String,
}

/// A row from the `packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Percentage, 0 to 100.
    pub discount: Option<f64>,
    pub image: Option<String>,
    #[sqlx(json)]
    pub includes: Vec<PackageInclude>,
    #[sqlx(json)]
    pub faqs: Vec<PackageFaq>,
    pub service_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackage {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub image: Option<String>,
    pub includes: Vec<PackageInclude>,
    #[serde(default)]
    pub faqs: Vec<PackageFaq>,
    pub service_id: DbId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackage {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub image: Option<String>,
    pub includes: Option<Vec<PackageInclude>>,
    pub faqs: Option<Vec<PackageFaq>>,
    pub service_id: Option<DbId>,
}

static INCLUDE_SCHEMA: Schema = Schema::new(
    "PackageInclude",
    &[
        FieldRule::required("title", FieldKind::Text),
        FieldRule::required("description", FieldKind::Text),
        FieldRule::required("items", FieldKind::TextList),
    ],
);

static FAQ_SCHEMA: Schema = Schema::new(
    "PackageFaq",
    &[
        FieldRule::required("question", FieldKind::Text),
        FieldRule::required("answer", FieldKind::Text),
    ],
);

pub static PACKAGE_SCHEMA: Schema = Schema::new(
    "Package",
    &[
        FieldRule::required("name", FieldKind::Text),
        FieldRule::required("description", FieldKind::Text),
        FieldRule::required("price", FieldKind::Number).checks(&[Check::Positive]),
        FieldRule::optional("discount", FieldKind::Number)
            .checks(&[Check::Min(0.0), Check::Max(100.0)]),
        FieldRule::optional("image", FieldKind::Text),
        FieldRule::required("includes", FieldKind::ObjectList(&INCLUDE_SCHEMA))
            .checks(&[Check::MinItems(1)]),
        FieldRule::optional("faqs", FieldKind::ObjectList(&FAQ_SCHEMA)),
        FieldRule::required("serviceId", FieldKind::Id),
    ],
);

impl Entity for Package {
    type Create = CreatePackage;
    type Update = UpdatePackage;

    const NAME: &'static str = "Package";
    const LABEL: &'static str = "Package";
    const PLURAL: &'static str = "Packages";
    const COUNT_KEY: &'static str = "totalPackages";
    const FILE_SLOTS: &'static [FileSlot] = &[FileSlot::single("image", "image", MediaKind::Image)];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];
    const FILTER_FIELDS: &'static [&'static str] = &["serviceId"];
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "serviceId",
        entity: "Service",
        table: "services",
    }];

    fn schema() -> &'static Schema {
        &PACKAGE_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        self.image.iter().cloned().collect()
    }
}
