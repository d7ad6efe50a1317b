//! The mutation pipeline shared by every entity.
//!
//! A mutation goes through: merge uploaded file paths into the payload,
//! validate, decode into the entity's DTO, persist. Uploads are committed
//! only when persistence succeeded and rolled back otherwise; files a
//! record no longer references are removed only after its update is
//! persisted, and a deleted record's files only after the row is gone.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::artifacts::{remove_artifact, ArtifactTracker};
use crate::error::CoreError;
use crate::pagination::{ListPage, ListQuery};
use crate::repository::{Entity, Repository, Revision};
use crate::types::DbId;
use crate::validation::{validate, Mode, Payload};

/// Runs validated, failure-safe mutations of `E` against one repository.
pub struct Pipeline<'a, E: Entity> {
    repo: &'a dyn Repository<E>,
    upload_root: PathBuf,
}

impl<'a, E: Entity> Pipeline<'a, E> {
    pub fn new(repo: &'a dyn Repository<E>, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            upload_root: upload_root.into(),
        }
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// An empty tracker for a request against this pipeline.
    pub fn tracker(&self) -> ArtifactTracker {
        ArtifactTracker::new(&self.upload_root)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn create(&self, payload: Payload, mut tracker: ArtifactTracker) -> Result<E, CoreError> {
        let outcome = async {
            let input: E::Create = decode::<E, _>(payload, &tracker, Mode::Create)?;
            self.repo.create(&input).await
        }
        .await;

        match outcome {
            Ok(record) => {
                let committed = tracker.commit();
                tracing::info!(
                    entity = E::NAME,
                    id = record.id(),
                    files = committed.files().len(),
                    "Entity created"
                );
                Ok(record)
            }
            Err(e) => {
                tracker.rollback().await;
                tracing::debug!(entity = E::NAME, error = %e, "Create rejected");
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        id: DbId,
        payload: Payload,
        mut tracker: ArtifactTracker,
    ) -> Result<E, CoreError> {
        let outcome = async {
            let input: E::Update = decode::<E, _>(payload, &tracker, Mode::Update)?;
            self.repo.update(id, &input).await
        }
        .await;

        match outcome {
            Ok(Revision { previous, current }) => {
                let committed = tracker.commit();
                committed
                    .supersede(&previous.artifacts(), &current.artifacts())
                    .await;
                tracing::info!(entity = E::NAME, id, "Entity updated");
                Ok(current)
            }
            Err(e) => {
                tracker.rollback().await;
                tracing::debug!(entity = E::NAME, id, error = %e, "Update rejected");
                Err(e)
            }
        }
    }

    /// Delete the row, then the files it owned.
    pub async fn delete(&self, id: DbId) -> Result<E, CoreError> {
        let record = self.repo.delete(id).await?;
        for path in record.artifacts() {
            remove_artifact(&self.upload_root, &path).await;
        }
        tracing::info!(entity = E::NAME, id, "Entity deleted");
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: DbId) -> Result<E, CoreError> {
        self.repo.find_by_id(id).await
    }

    /// A page of records; an empty page is reported as `NoResults`.
    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<E>, CoreError> {
        let (items, total) = self.repo.find_many(query).await?;
        if items.is_empty() {
            return Err(CoreError::NoResults(E::empty_message()));
        }
        Ok(ListPage::new(items, total, query, E::COUNT_KEY))
    }

    /// Every record matching `query`, unpaginated.
    pub async fn list_all(&self, query: ListQuery) -> Result<Vec<E>, CoreError> {
        let (items, _) = self.repo.find_many(&ListQuery { limit: None, ..query }).await?;
        if items.is_empty() {
            return Err(CoreError::NoResults(E::empty_message()));
        }
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Payload assembly
// ---------------------------------------------------------------------------

/// Substitute stored upload paths for the entity's file fields. Values the
/// client sent for those fields are discarded; paths only come from uploads.
pub fn merge_uploads<E: Entity>(
    mut payload: Payload,
    tracker: &ArtifactTracker,
) -> Result<Payload, CoreError> {
    if let Some(stray) = tracker
        .uploads()
        .iter()
        .find(|file| !E::FILE_SLOTS.iter().any(|s| s.upload_field == file.field_name))
    {
        return Err(CoreError::invalid_field(
            stray.field_name.clone(),
            format!("\"{}\" is not allowed", stray.field_name),
        ));
    }

    for slot in E::FILE_SLOTS {
        payload.remove(slot.payload_field);
        let paths: Vec<&str> = tracker
            .uploads()
            .iter()
            .filter(|file| file.field_name == slot.upload_field)
            .map(|file| file.path.as_str())
            .collect();
        match (slot.multiple, paths.as_slice()) {
            (_, []) => {}
            (true, many) => {
                payload.insert(
                    slot.payload_field.to_string(),
                    Value::Array(many.iter().map(|p| Value::from(*p)).collect()),
                );
            }
            (false, [single]) => {
                payload.insert(slot.payload_field.to_string(), Value::from(*single));
            }
            (false, _) => {
                return Err(CoreError::invalid_field(
                    slot.upload_field,
                    format!("\"{}\" accepts a single file", slot.upload_field),
                ));
            }
        }
    }
    Ok(payload)
}

fn decode<E: Entity, T: DeserializeOwned>(
    payload: Payload,
    tracker: &ArtifactTracker,
    mode: Mode,
) -> Result<T, CoreError> {
    let merged = merge_uploads::<E>(payload, tracker)?;
    let mut normalized = validate(E::schema(), &merged, mode)?;
    E::prepare(&mut normalized)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| CoreError::Validation(format!("{} payload: {e}", E::LABEL)))
}
