//! Entity metadata and the datastore-neutral repository interface.
//!
//! Every content type implements [`Entity`] (declared once, next to its
//! model) and is persisted through a [`Repository`]. The db crate provides a
//! Postgres and an in-memory implementation of each.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::enums::UserStatus;
use crate::error::CoreError;
use crate::pagination::ListQuery;
use crate::types::DbId;
use crate::validation::{Payload, Schema};

/// Media type a file slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Whether a MIME type is acceptable for this kind.
    pub fn accepts(self, mime_type: &str) -> bool {
        match self {
            Self::Image => mime_type.starts_with("image/"),
            Self::Video => mime_type.starts_with("video/"),
        }
    }
}

/// A multipart file field and the payload field its stored path fills.
#[derive(Debug, Clone, Copy)]
pub struct FileSlot {
    /// Multipart field name, e.g. `"image"`.
    pub upload_field: &'static str,
    /// Payload field receiving the stored path, e.g. `"imageUrl"`.
    pub payload_field: &'static str,
    pub kind: MediaKind,
    /// Whether the slot takes several files (stored as a list).
    pub multiple: bool,
}

impl FileSlot {
    pub const fn single(upload_field: &'static str, payload_field: &'static str, kind: MediaKind) -> Self {
        Self {
            upload_field,
            payload_field,
            kind,
            multiple: false,
        }
    }

    pub const fn many(upload_field: &'static str, payload_field: &'static str, kind: MediaKind) -> Self {
        Self {
            upload_field,
            payload_field,
            kind,
            multiple: true,
        }
    }
}

/// A foreign key from a payload field to another entity.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    /// Payload field holding the id, e.g. `"categoryId"`.
    pub field: &'static str,
    /// [`Entity::NAME`] of the referenced entity.
    pub entity: &'static str,
    /// Table of the referenced entity.
    pub table: &'static str,
}

impl Reference {
    /// Message used when the referenced row does not exist.
    pub fn missing_message(&self) -> String {
        format!("The specified {} ID does not exist", self.entity.to_lowercase())
    }
}

/// A persisted content type.
pub trait Entity: Serialize + Clone + Send + Sync + 'static {
    /// Validated create payload.
    type Create: DeserializeOwned + Serialize + Send + Sync;
    /// Validated partial-update payload; every field optional.
    type Update: DeserializeOwned + Serialize + Send + Sync;

    /// Type name, e.g. `"ServiceBooking"`.
    const NAME: &'static str;
    /// Singular for messages, e.g. `"Service booking"`.
    const LABEL: &'static str;
    /// Plural for messages, e.g. `"Service bookings"`.
    const PLURAL: &'static str;
    /// Key of the total in list envelopes, e.g. `"totalServiceBookings"`.
    const COUNT_KEY: &'static str;

    /// Uploadable file fields.
    const FILE_SLOTS: &'static [FileSlot] = &[];
    /// Serialized text fields searched by the free-text query.
    const SEARCH_FIELDS: &'static [&'static str] = &[];
    /// Serialized fields clients may filter on.
    const FILTER_FIELDS: &'static [&'static str] = &[];
    /// Serialized fields that must be unique across rows.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];
    const REFERENCES: &'static [Reference] = &[];

    fn schema() -> &'static Schema;

    fn id(&self) -> DbId;

    /// Stored file paths this record owns.
    fn artifacts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Last transformation of a validated payload before it is decoded
    /// into `Create` / `Update`.
    fn prepare(_payload: &mut Payload) -> Result<(), CoreError> {
        Ok(())
    }

    /// "No movies found".
    fn empty_message() -> String {
        format!("No {} found", Self::PLURAL.to_lowercase())
    }
}

/// A row as it was before an update and as the update left it.
#[derive(Debug, Clone)]
pub struct Revision<E> {
    pub previous: E,
    pub current: E,
}

/// Uniform persistence interface for one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Insert a record. Unique violations surface as `Conflict`, missing
    /// references as `Reference`.
    async fn create(&self, input: &E::Create) -> Result<E, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<E, CoreError>;

    /// One page of matching records plus the total number of matches.
    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<E>, i64), CoreError>;

    /// Apply a partial update; absent fields keep their value.
    ///
    /// The previous row is read under the same lock as the write, so two
    /// concurrent updates each see the row the other replaced.
    async fn update(&self, id: DbId, input: &E::Update) -> Result<Revision<E>, CoreError>;

    /// Remove a record and return it as it was.
    async fn delete(&self, id: DbId) -> Result<E, CoreError>;

    async fn count(&self) -> Result<i64, CoreError>;
}

/// Login material of an account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    /// `None` for accounts without a status (admins).
    pub status: Option<UserStatus>,
}

/// Credential lookup by email.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, CoreError>;
}

/// Admin accounts: credential lookup plus the startup bootstrap.
#[async_trait]
pub trait AdminRepository: AccountRepository {
    /// Insert the admin unless one with this email exists. Returns whether
    /// a row was created.
    async fn ensure(&self, email: &str, password_hash: &str) -> Result<bool, CoreError>;
}
