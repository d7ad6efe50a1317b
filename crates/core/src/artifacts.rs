//! Lifecycle of uploaded files attached to a single request.
//!
//! The upload layer records every file it writes into an [`ArtifactTracker`].
//! The tracker is then either committed (files now belong to a persisted
//! record) or rolled back (files deleted). A tracker dropped without a
//! decision, e.g. because the request timed out or the client went away,
//! deletes whatever it still holds.
//!
//! Only a [`CommittedArtifacts`] value can supersede previous files, so old
//! files are never removed before the replacement is safely persisted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A file written to storage while handling the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Multipart field name the file arrived under, e.g. `"image"`.
    pub field_name: String,
    /// Public, storage-relative path, e.g. `"uploads/3f2a....png"`.
    pub path: String,
    pub mime_type: String,
    pub size: u64,
}

/// Files written during one request and not yet claimed by a record.
#[derive(Debug, Default)]
pub struct ArtifactTracker {
    root: PathBuf,
    pending: Vec<UploadedFile>,
}

/// Files owned by a persisted record.
#[derive(Debug)]
pub struct CommittedArtifacts {
    root: PathBuf,
    files: Vec<UploadedFile>,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

impl ArtifactTracker {
    /// Tracker whose recorded paths resolve relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pending: Vec::new(),
        }
    }

    /// Register a file that has been fully written.
    pub fn record_written(&mut self, file: UploadedFile) {
        self.pending.push(file);
    }

    /// Files recorded so far, in arrival order.
    pub fn uploads(&self) -> &[UploadedFile] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Delete every pending file. Safe to call more than once; files that
    /// are already gone are ignored.
    pub async fn rollback(&mut self) {
        for file in self.pending.drain(..) {
            remove_artifact(&self.root, &file.path).await;
        }
    }

    /// Hand the pending files over to the record that now references them.
    pub fn commit(mut self) -> CommittedArtifacts {
        CommittedArtifacts {
            root: std::mem::take(&mut self.root),
            files: std::mem::take(&mut self.pending),
        }
    }
}

impl Drop for ArtifactTracker {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        tracing::warn!(
            count = self.pending.len(),
            "Upload tracker dropped without commit; removing files"
        );
        for file in self.pending.drain(..) {
            if ensure_contained(&file.path).is_err() {
                continue;
            }
            let full = resolve(&self.root, &file.path);
            if let Err(e) = std::fs::remove_file(&full) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %full.display(), error = %e, "Failed to remove upload");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Committed files
// ---------------------------------------------------------------------------

impl CommittedArtifacts {
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Remove the previous files of a record once its new state is
    /// persisted. Paths the record still references are kept.
    pub async fn supersede(&self, previous: &[String], current: &[String]) {
        for path in previous {
            if !current.contains(path) {
                remove_artifact(&self.root, path).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Public prefix of every stored path; `/uploads/*` serves the upload root.
pub const PUBLIC_PREFIX: &str = "uploads";

/// Stored path of a file written as `file_name` under the upload root.
pub fn stored_path(file_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{file_name}")
}

/// Map a stored path onto the filesystem below `root`.
pub fn resolve(root: &Path, stored: &str) -> PathBuf {
    let relative = Path::new(stored);
    root.join(relative.strip_prefix(PUBLIC_PREFIX).unwrap_or(relative))
}

/// Delete a stored file, logging (not failing) on anything but success or
/// "already gone".
pub async fn remove_artifact(root: &Path, stored: &str) {
    if let Err(e) = ensure_contained(stored) {
        tracing::warn!(error = %e, "Refusing to remove artifact");
        return;
    }
    let full = resolve(root, stored);
    match tokio::fs::remove_file(&full).await {
        Ok(()) => tracing::debug!(path = %full.display(), "Removed artifact"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %full.display(), error = %e, "Failed to remove artifact"),
    }
}

/// Reject stored paths that would escape the upload root.
pub fn ensure_contained(stored: &str) -> Result<(), CoreError> {
    let escapes = Path::new(stored)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes {
        Err(CoreError::Validation(format!("Invalid artifact path '{stored}'")))
    } else {
        Ok(())
    }
}
