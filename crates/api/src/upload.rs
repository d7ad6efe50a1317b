//! The upload layer: turns a mutation request into a payload plus the
//! files written for it.
//!
//! Multipart file parts are streamed to the upload directory under a
//! generated name and recorded in the request's [`ArtifactTracker`]; text
//! parts become payload values. JSON bodies become the payload directly.
//! Any failure here rolls back the files already written.

use std::marker::PhantomData;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use ott_core::artifacts::{remove_artifact, stored_path, ArtifactTracker, UploadedFile};
use ott_core::error::CoreError;
use ott_core::repository::{Entity, MediaKind};
use ott_core::validation::Payload;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A create or update request for `E`, files already on disk.
pub struct Submission<E> {
    pub payload: Payload,
    pub tracker: ArtifactTracker,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> FromRequest<AppState> for Submission<E> {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let upload = &state.config.upload;
        let tracker = ArtifactTracker::new(upload.dir.clone());

        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        let (payload, tracker) = if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            read_multipart::<E>(multipart, upload, tracker).await?
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            (json_payload(&body)?, tracker)
        };

        Ok(Self {
            payload,
            tracker,
            entity: PhantomData,
        })
    }
}

/// Parse a JSON object body. An empty body is an empty payload.
pub fn json_payload(body: &[u8]) -> AppResult<Payload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest(
            "Request body must be a JSON object".into(),
        )),
        Err(e) => Err(AppError::BadRequest(format!("Invalid JSON body: {e}"))),
    }
}

/// Read every part of a multipart body for `E`.
pub async fn read_multipart<E: Entity>(
    mut multipart: Multipart,
    config: &UploadConfig,
    mut tracker: ArtifactTracker,
) -> AppResult<(Payload, ArtifactTracker)> {
    match collect_parts::<E>(&mut multipart, config, &mut tracker).await {
        Ok(payload) => Ok((payload, tracker)),
        Err(e) => {
            tracker.rollback().await;
            Err(e)
        }
    }
}

async fn collect_parts<E: Entity>(
    multipart: &mut Multipart,
    config: &UploadConfig,
    tracker: &mut ArtifactTracker,
) -> AppResult<Payload> {
    let mut payload = Payload::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        // `images[]` and `images` name the same slot.
        let name = field
            .name()
            .unwrap_or_default()
            .trim_end_matches("[]")
            .to_string();

        let file_name = field.file_name().map(str::to_owned);
        match file_name.as_deref() {
            // A file input left empty by the browser.
            Some("") => continue,
            Some(_) => {
                let slot = E::FILE_SLOTS
                    .iter()
                    .find(|slot| slot.upload_field == name)
                    .ok_or_else(|| {
                        CoreError::invalid_field(name.clone(), format!("\"{name}\" is not allowed"))
                    })?;
                let file = store_file(field, &name, slot.kind, config).await?;
                tracing::debug!(field = %file.field_name, path = %file.path, size = file.size, "Stored upload");
                tracker.record_written(file);
            }
            None => {
                let text = field.text().await.map_err(bad_multipart)?;
                insert_text(&mut payload, name, text);
            }
        }
    }

    Ok(payload)
}

/// Repeated text parts collect into an array.
fn insert_text(payload: &mut Payload, name: String, text: String) {
    match payload.get_mut(&name) {
        None => {
            payload.insert(name, Value::String(text));
        }
        Some(Value::Array(values)) => values.push(Value::String(text)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(text)]);
        }
    }
}

/// Stream one file part to disk, enforcing type and size.
async fn store_file(
    mut field: Field<'_>,
    name: &str,
    kind: MediaKind,
    config: &UploadConfig,
) -> AppResult<UploadedFile> {
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    if !kind.accepts(&mime_type) {
        return Err(CoreError::invalid_field(
            name,
            format!("\"{name}\" must be {} file", kind_label(kind)),
        )
        .into());
    }
    let limit = match kind {
        MediaKind::Image => config.max_image_bytes,
        MediaKind::Video => config.max_video_bytes,
    };

    tokio::fs::create_dir_all(&config.dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload directory: {e}")))?;

    let file_name = format!(
        "{}{}",
        Uuid::new_v4(),
        extension(field.file_name().unwrap_or_default())
    );
    let stored = stored_path(&file_name);
    let mut out = tokio::fs::File::create(config.dir.join(&file_name))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload file: {e}")))?;

    let mut size: u64 = 0;
    let written: AppResult<()> = async {
        while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
            size += chunk.len() as u64;
            if size > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "\"{name}\" exceeds the maximum size of {limit} bytes"
                )));
            }
            out.write_all(&chunk)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;
        }
        out.flush()
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))
    }
    .await;

    if let Err(e) = written {
        drop(out);
        remove_artifact(&config.dir, &stored).await;
        return Err(e);
    }

    Ok(UploadedFile {
        field_name: name.to_string(),
        path: stored,
        mime_type,
        size,
    })
}

fn kind_label(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "an image",
        MediaKind::Video => "a video",
    }
}

/// `.png` from `Poster.PNG`; empty when missing or unusual.
fn extension(original: &str) -> String {
    Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}
