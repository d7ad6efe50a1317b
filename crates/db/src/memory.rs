//! In-process datastore with the same observable semantics as Postgres:
//! generated ids, unique fields, foreign keys (checked on write and on
//! delete), row checks, search, filters and newest-first paging.
//!
//! Every operation holds the store lock for its whole duration and never
//! across an `.await`, so each one is atomic.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{
    AccountRepository, AdminRepository, Credentials, Entity, Reference, Repository, Revision,
};
use ott_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;

use crate::error::{duplicate_message, in_use_message};
use crate::models::banner::Banner;
use crate::models::category::Category;
use crate::models::enquiry::Enquiry;
use crate::models::movie::Movie;
use crate::models::package::Package;
use crate::models::service::Service;
use crate::models::service_booking::ServiceBooking;
use crate::models::user::User;

// ---------------------------------------------------------------------------
// Entity hooks
// ---------------------------------------------------------------------------

/// How an entity is built and patched without SQL.
pub trait MemoryEntity: Entity {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self;

    /// Apply every `Some` field of `input`.
    fn apply_update(&mut self, input: &Self::Update, now: Timestamp);

    /// Row-level constraints the database would check.
    fn check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

struct StoredRow {
    record: Box<dyn Any + Send + Sync>,
    /// Serialized form, used for unique, reference, search and filter checks.
    snapshot: Value,
}

#[derive(Default)]
struct Tables {
    next_id: DbId,
    rows: HashMap<&'static str, BTreeMap<DbId, StoredRow>>,
    /// Outgoing references per entity, registered by its repository.
    references: HashMap<&'static str, &'static [Reference]>,
    admins: Vec<Credentials>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn table(&self, entity: &str) -> Option<&BTreeMap<DbId, StoredRow>> {
        self.rows.get(entity)
    }

    fn exists(&self, entity: &str, id: DbId) -> bool {
        self.table(entity).is_some_and(|t| t.contains_key(&id))
    }
}

/// Shared in-memory tables. Cheap to clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Internal("Memory store lock poisoned".into()))
    }

    /// Repository for `E` backed by this store.
    pub fn repo<E: MemoryEntity>(&self) -> MemoryRepo<E> {
        if let Ok(mut tables) = self.inner.lock() {
            tables.references.insert(E::NAME, E::REFERENCES);
            tables.rows.entry(E::NAME).or_default();
        }
        MemoryRepo {
            store: self.clone(),
            _entity: PhantomData,
        }
    }

    /// Admin accounts held by this store.
    pub fn admins(&self) -> MemoryAdmins {
        MemoryAdmins {
            store: self.clone(),
        }
    }
}

fn snapshot(value: &impl Serialize) -> Result<Value, CoreError> {
    serde_json::to_value(value)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize record: {e}")))
}

fn downcast<E: Entity>(row: &StoredRow) -> Result<&E, CoreError> {
    row.record
        .downcast_ref::<E>()
        .ok_or_else(|| CoreError::Internal(format!("Stored row is not a {}", E::NAME)))
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// [`Repository`] over a [`MemoryStore`].
pub struct MemoryRepo<E> {
    store: MemoryStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E: MemoryEntity> MemoryRepo<E> {
    /// Unique fields of `candidate` must not appear in any other row.
    fn check_unique(tables: &Tables, candidate: &Value, skip: Option<DbId>) -> Result<(), CoreError> {
        let Some(rows) = tables.table(E::NAME) else {
            return Ok(());
        };
        for field in E::UNIQUE_FIELDS {
            let Some(value) = candidate.get(*field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = rows
                .iter()
                .filter(|(id, _)| Some(**id) != skip)
                .any(|(_, row)| row.snapshot.get(*field) == Some(value));
            if taken {
                return Err(CoreError::Conflict(duplicate_message(E::LABEL, field)));
            }
        }
        Ok(())
    }

    fn check_references(tables: &Tables, candidate: &Value) -> Result<(), CoreError> {
        for reference in E::REFERENCES {
            let Some(id) = candidate.get(reference.field).and_then(Value::as_i64) else {
                continue;
            };
            if !tables.exists(reference.entity, id) {
                return Err(CoreError::Reference(reference.missing_message()));
            }
        }
        Ok(())
    }

    /// Rows of other entities still pointing at `id`.
    fn check_not_referenced(tables: &Tables, id: DbId) -> Result<(), CoreError> {
        for (entity, references) in &tables.references {
            for reference in references.iter().filter(|r| r.entity == E::NAME) {
                let in_use = tables.table(entity).is_some_and(|rows| {
                    rows.values()
                        .any(|row| row.snapshot.get(reference.field).and_then(Value::as_i64) == Some(id))
                });
                if in_use {
                    return Err(CoreError::Conflict(in_use_message(E::LABEL)));
                }
            }
        }
        Ok(())
    }

    fn not_found(id: DbId) -> CoreError {
        CoreError::NotFound {
            entity: E::LABEL,
            id,
        }
    }
}

fn matches(snapshot: &Value, query: &ListQuery, search_fields: &[&str]) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let hit = search_fields.iter().any(|field| {
            snapshot
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        });
        if !hit {
            return false;
        }
    }
    query.filters.iter().all(|filter| {
        let actual = match snapshot.get(filter.field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => return false,
            Some(other) => other.to_string(),
        };
        filter.values.contains(&actual)
    })
}

#[async_trait]
impl<E: MemoryEntity> Repository<E> for MemoryRepo<E> {
    async fn create(&self, input: &E::Create) -> Result<E, CoreError> {
        let mut tables = self.store.lock()?;
        let candidate = snapshot(input)?;
        Self::check_references(&tables, &candidate)?;
        Self::check_unique(&tables, &candidate, None)?;

        let id = tables.next_id();
        let record = E::from_create(id, Utc::now(), input);
        record.check()?;
        let row = StoredRow {
            record: Box::new(record.clone()),
            snapshot: snapshot(&record)?,
        };
        tables.rows.entry(E::NAME).or_default().insert(id, row);
        Ok(record)
    }

    async fn find_by_id(&self, id: DbId) -> Result<E, CoreError> {
        let tables = self.store.lock()?;
        let row = tables
            .table(E::NAME)
            .and_then(|rows| rows.get(&id))
            .ok_or_else(|| Self::not_found(id))?;
        downcast::<E>(row).cloned()
    }

    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<E>, i64), CoreError> {
        let tables = self.store.lock()?;
        let Some(rows) = tables.table(E::NAME) else {
            return Ok((Vec::new(), 0));
        };
        // Ids grow with insertion time, so reverse id order is newest first.
        let matching: Vec<&StoredRow> = rows
            .values()
            .rev()
            .filter(|row| matches(&row.snapshot, query, E::SEARCH_FIELDS))
            .collect();
        let total = matching.len() as i64;
        let skip = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let take = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|row| downcast::<E>(row).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok((page, total))
    }

    async fn update(&self, id: DbId, input: &E::Update) -> Result<Revision<E>, CoreError> {
        let mut tables = self.store.lock()?;
        let patch = snapshot(input)?;
        Self::check_references(&tables, &patch)?;
        Self::check_unique(&tables, &patch, Some(id))?;

        let current = tables
            .table(E::NAME)
            .and_then(|rows| rows.get(&id))
            .ok_or_else(|| Self::not_found(id))?;
        let previous = downcast::<E>(current)?.clone();
        let mut record = previous.clone();
        record.apply_update(input, Utc::now());
        record.check()?;

        let row = StoredRow {
            record: Box::new(record.clone()),
            snapshot: snapshot(&record)?,
        };
        tables.rows.entry(E::NAME).or_default().insert(id, row);
        Ok(Revision {
            previous,
            current: record,
        })
    }

    async fn delete(&self, id: DbId) -> Result<E, CoreError> {
        let mut tables = self.store.lock()?;
        if !tables.exists(E::NAME, id) {
            return Err(Self::not_found(id));
        }
        Self::check_not_referenced(&tables, id)?;
        let row = tables
            .rows
            .get_mut(E::NAME)
            .and_then(|rows| rows.remove(&id))
            .ok_or_else(|| Self::not_found(id))?;
        row.record
            .downcast::<E>()
            .map(|boxed| *boxed)
            .map_err(|_| CoreError::Internal(format!("Stored row is not a {}", E::NAME)))
    }

    async fn count(&self) -> Result<i64, CoreError> {
        let tables = self.store.lock()?;
        Ok(tables.table(E::NAME).map_or(0, |rows| rows.len() as i64))
    }
}

#[async_trait]
impl AccountRepository for MemoryRepo<User> {
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
        let tables = self.store.lock()?;
        let Some(rows) = tables.table(User::NAME) else {
            return Ok(None);
        };
        for row in rows.values() {
            let user = downcast::<User>(row)?;
            if user.email == email {
                return Ok(Some(Credentials {
                    id: user.id,
                    email: user.email.clone(),
                    password_hash: user.password_hash.clone(),
                    status: Some(user.status),
                }));
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Admins
// ---------------------------------------------------------------------------

/// Admin accounts over a [`MemoryStore`].
pub struct MemoryAdmins {
    store: MemoryStore,
}

#[async_trait]
impl AccountRepository for MemoryAdmins {
    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
        let tables = self.store.lock()?;
        Ok(tables.admins.iter().find(|a| a.email == email).cloned())
    }
}

#[async_trait]
impl AdminRepository for MemoryAdmins {
    async fn ensure(&self, email: &str, password_hash: &str) -> Result<bool, CoreError> {
        let mut tables = self.store.lock()?;
        if tables.admins.iter().any(|a| a.email == email) {
            return Ok(false);
        }
        let id = tables.next_id();
        tables.admins.push(Credentials {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            status: None,
        });
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Entity implementations
// ---------------------------------------------------------------------------

/// Overwrite `target` when the patch carries a value.
fn patch<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

/// Same as [`patch`] for nullable columns.
fn patch_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

impl MemoryEntity for Category {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            name: input.name.clone(),
            image_url: input.image_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.name, &input.name);
        patch_opt(&mut self.image_url, &input.image_url);
        self.updated_at = now;
    }
}

impl MemoryEntity for Movie {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            video: input.video(),
            status: input.status,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.name, &input.name);
        patch(&mut self.description, &input.description);
        patch(&mut self.image_url, &input.image_url);
        patch(&mut self.video, &input.video());
        patch(&mut self.status, &input.status);
        patch(&mut self.category_id, &input.category_id);
        self.updated_at = now;
    }

    fn check(&self) -> Result<(), CoreError> {
        let empty = self
            .video
            .uploaded_path()
            .or(self.video.link_url())
            .is_none_or(str::is_empty);
        if empty {
            return Err(CoreError::Validation(
                "Movie violates constraint \"movies_video_check\"".into(),
            ));
        }
        Ok(())
    }
}

impl MemoryEntity for Banner {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            image: input.image.clone(),
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.image, &input.image);
        patch(&mut self.active, &input.active);
        self.updated_at = now;
    }
}

impl MemoryEntity for User {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            status: input.status,
            image: input.image.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.name, &input.name);
        patch(&mut self.email, &input.email);
        patch(&mut self.password_hash, &input.password_hash);
        patch(&mut self.status, &input.status);
        patch_opt(&mut self.image, &input.image);
        self.updated_at = now;
    }
}

impl MemoryEntity for Service {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            amount: input.amount,
            discount: input.discount,
            fasting_time: input.fasting_time.clone(),
            result_duration: input.result_duration.clone(),
            sample_type: input.sample_type.clone(),
            age_group: input.age_group.clone(),
            home_sample_collection: input.home_sample_collection.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.name, &input.name);
        patch(&mut self.description, &input.description);
        patch_opt(&mut self.image, &input.image);
        patch(&mut self.amount, &input.amount);
        patch_opt(&mut self.discount, &input.discount);
        patch_opt(&mut self.fasting_time, &input.fasting_time);
        patch_opt(&mut self.result_duration, &input.result_duration);
        patch(&mut self.sample_type, &input.sample_type);
        patch(&mut self.age_group, &input.age_group);
        patch_opt(&mut self.home_sample_collection, &input.home_sample_collection);
        self.updated_at = now;
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.discount_within_amount() {
            Ok(())
        } else {
            Err(CoreError::Validation(
                "Service violates constraint \"services_discount_check\"".into(),
            ))
        }
    }
}

impl MemoryEntity for Package {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            discount: input.discount,
            image: input.image.clone(),
            includes: input.includes.clone(),
            faqs: input.faqs.clone(),
            service_id: input.service_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.name, &input.name);
        patch(&mut self.description, &input.description);
        patch(&mut self.price, &input.price);
        patch_opt(&mut self.discount, &input.discount);
        patch_opt(&mut self.image, &input.image);
        patch(&mut self.includes, &input.includes);
        patch(&mut self.faqs, &input.faqs);
        patch(&mut self.service_id, &input.service_id);
        self.updated_at = now;
    }
}

impl MemoryEntity for ServiceBooking {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            patient_name: input.patient_name.clone(),
            mobile_number: input.mobile_number.clone(),
            preference: input.preference.clone(),
            address: input.address.clone(),
            date: input.date,
            time: input.time.clone(),
            payment_type: input.payment_type,
            total_price: input.total_price,
            status: input.status,
            service_id: input.service_id,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch(&mut self.patient_name, &input.patient_name);
        patch(&mut self.mobile_number, &input.mobile_number);
        patch(&mut self.preference, &input.preference);
        patch_opt(&mut self.address, &input.address);
        patch(&mut self.date, &input.date);
        patch(&mut self.time, &input.time);
        patch(&mut self.payment_type, &input.payment_type);
        patch(&mut self.total_price, &input.total_price);
        patch(&mut self.status, &input.status);
        patch(&mut self.service_id, &input.service_id);
        patch(&mut self.user_id, &input.user_id);
        self.updated_at = now;
    }
}

impl MemoryEntity for Enquiry {
    fn from_create(id: DbId, now: Timestamp, input: &Self::Create) -> Self {
        Self {
            id,
            enquiry: input.enquiry.clone(),
            phone_number: input.phone_number.clone(),
            image: input.image.clone(),
            images: input.images.clone(),
            status: input.status.clone(),
            remarks: input.remarks.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &Self::Update, now: Timestamp) {
        patch_opt(&mut self.enquiry, &input.enquiry);
        patch(&mut self.phone_number, &input.phone_number);
        patch_opt(&mut self.image, &input.image);
        patch(&mut self.images, &input.images);
        patch_opt(&mut self.status, &input.status);
        patch_opt(&mut self.remarks, &input.remarks);
        self.updated_at = now;
    }
}
