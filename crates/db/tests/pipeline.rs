//! Mutation pipeline behaviour against the memory store.
//!
//! Covers file cleanup on every failure path, supersede ordering,
//! referential integrity, partial updates and list paging.

use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use async_trait::async_trait;
use ott_core::artifacts::{ArtifactTracker, UploadedFile};
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::password::verify_password;
use ott_core::pipeline::Pipeline;
use ott_core::repository::{Repository, Revision};
use ott_core::types::DbId;
use ott_core::validation::Payload;
use ott_db::models::category::{Category, CreateCategory, UpdateCategory};
use ott_db::models::movie::Movie;
use ott_db::models::user::User;
use ott_db::Datastore;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    }
}

fn upload_root(dir: &tempfile::TempDir) -> PathBuf {
    let root = dir.path().join("uploads");
    std::fs::create_dir_all(&root).unwrap();
    root
}

/// Write a file as the upload layer would and record it.
fn upload(tracker: &mut ArtifactTracker, root: &Path, field: &str, name: &str) -> String {
    std::fs::write(root.join(name), b"bytes").unwrap();
    let path = format!("uploads/{name}");
    tracker.record_written(UploadedFile {
        field_name: field.to_string(),
        path: path.clone(),
        mime_type: "image/png".into(),
        size: 5,
    });
    path
}

fn on_disk(root: &Path, stored: &str) -> bool {
    root.join(stored.trim_start_matches("uploads/")).exists()
}

async fn seed_category(ds: &Datastore, name: &str) -> Category {
    ds.categories
        .create(&CreateCategory {
            name: name.to_string(),
            image_url: None,
        })
        .await
        .unwrap()
}

/// Delegates to the inner repository but fails every update.
struct FailingUpdates<'a>(&'a dyn Repository<Category>);

#[async_trait]
impl Repository<Category> for FailingUpdates<'_> {
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError> {
        self.0.create(input).await
    }
    async fn find_by_id(&self, id: DbId) -> Result<Category, CoreError> {
        self.0.find_by_id(id).await
    }
    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Category>, i64), CoreError> {
        self.0.find_many(query).await
    }
    async fn update(
        &self,
        _id: DbId,
        _input: &UpdateCategory,
    ) -> Result<Revision<Category>, CoreError> {
        Err(CoreError::Internal("connection reset".into()))
    }
    async fn delete(&self, id: DbId) -> Result<Category, CoreError> {
        self.0.delete(id).await
    }
    async fn count(&self) -> Result<i64, CoreError> {
        self.0.count().await
    }
}

/// Lets another writer replace the image right before each update lands.
struct InterleavedWrites<'a> {
    inner: &'a dyn Repository<Category>,
    image: String,
}

#[async_trait]
impl Repository<Category> for InterleavedWrites<'_> {
    async fn create(&self, input: &CreateCategory) -> Result<Category, CoreError> {
        self.inner.create(input).await
    }
    async fn find_by_id(&self, id: DbId) -> Result<Category, CoreError> {
        self.inner.find_by_id(id).await
    }
    async fn find_many(&self, query: &ListQuery) -> Result<(Vec<Category>, i64), CoreError> {
        self.inner.find_many(query).await
    }
    async fn update(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Revision<Category>, CoreError> {
        let other = UpdateCategory {
            image_url: Some(self.image.clone()),
            ..Default::default()
        };
        self.inner.update(id, &other).await?;
        self.inner.update(id, input).await
    }
    async fn delete(&self, id: DbId) -> Result<Category, CoreError> {
        self.inner.delete(id).await
    }
    async fn count(&self) -> Result<i64, CoreError> {
        self.inner.count().await
    }
}

// ---------------------------------------------------------------------------
// No orphaned files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_failure_removes_uploaded_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let category = seed_category(&ds, "Drama").await;
    let pipeline = Pipeline::new(ds.movies.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let image = upload(&mut tracker, &root, "image", "poster.png");

    // `name` missing.
    let err = pipeline
        .create(
            payload(json!({
                "description": "d",
                "videoSource": "LINK",
                "videoUrl": "https://cdn.example.com/v.mp4",
                "categoryId": category.id,
            })),
            tracker,
        )
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::InvalidField { field, .. } if field == "name");
    assert!(!on_disk(&root, &image));
}

#[tokio::test]
async fn unknown_category_is_a_reference_error_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.movies.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let image = upload(&mut tracker, &root, "image", "poster.png");

    let err = pipeline
        .create(
            payload(json!({
                "name": "Dune",
                "description": "Sand",
                "videoSource": "LINK",
                "videoUrl": "https://cdn.example.com/v.mp4",
                "categoryId": 999,
            })),
            tracker,
        )
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Reference(msg) if msg.contains("category"));
    assert!(!on_disk(&root, &image));
    assert_eq!(ds.movies.count().await.unwrap(), 0);
}

#[tokio::test]
async fn successful_create_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let category = seed_category(&ds, "Drama").await;
    let pipeline = Pipeline::new(ds.movies.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let image = upload(&mut tracker, &root, "image", "poster.png");
    let video = upload(&mut tracker, &root, "movie", "film.mp4");

    let movie: Movie = pipeline
        .create(
            payload(json!({
                "name": "Dune",
                "description": "Sand",
                "videoSource": "UPLOAD",
                "categoryId": category.id.to_string(),
            })),
            tracker,
        )
        .await
        .unwrap();

    assert_eq!(movie.image_url, image);
    assert_eq!(movie.video.uploaded_path(), Some(video.as_str()));
    assert!(on_disk(&root, &image));
    assert!(on_disk(&root, &video));
}

// ---------------------------------------------------------------------------
// Supersede ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_update_keeps_old_file_and_drops_new_one() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let old = upload(&mut tracker, &root, "image", "old.png");
    let category = pipeline
        .create(payload(json!({"name": "Drama"})), tracker)
        .await
        .unwrap();

    let failing = FailingUpdates(ds.categories.as_ref());
    let failing_pipeline = Pipeline::new(&failing, &root);
    let mut tracker = failing_pipeline.tracker();
    let new = upload(&mut tracker, &root, "image", "new.png");

    let err = failing_pipeline
        .update(category.id, Payload::new(), tracker)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Internal(_));
    assert!(on_disk(&root, &old), "old artifact must survive a failed update");
    assert!(!on_disk(&root, &new), "new artifact must be rolled back");
}

#[tokio::test]
async fn successful_update_supersedes_old_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let old = upload(&mut tracker, &root, "image", "old.png");
    let category = pipeline
        .create(payload(json!({"name": "Drama"})), tracker)
        .await
        .unwrap();

    let mut tracker = pipeline.tracker();
    let new = upload(&mut tracker, &root, "image", "new.png");
    let updated = pipeline
        .update(category.id, Payload::new(), tracker)
        .await
        .unwrap();

    assert_eq!(updated.image_url.as_deref(), Some(new.as_str()));
    assert_eq!(updated.name, "Drama");
    assert!(!on_disk(&root, &old));
    assert!(on_disk(&root, &new));
}

#[tokio::test]
async fn update_supersedes_the_row_it_actually_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    upload(&mut tracker, &root, "image", "old.png");
    let category = pipeline
        .create(payload(json!({"name": "Drama"})), tracker)
        .await
        .unwrap();

    std::fs::write(root.join("other.png"), b"bytes").unwrap();
    let interleaved = InterleavedWrites {
        inner: ds.categories.as_ref(),
        image: "uploads/other.png".into(),
    };
    let racing = Pipeline::new(&interleaved, &root);
    let mut tracker = racing.tracker();
    let new = upload(&mut tracker, &root, "image", "new.png");
    let updated = racing
        .update(category.id, Payload::new(), tracker)
        .await
        .unwrap();

    assert_eq!(updated.image_url.as_deref(), Some(new.as_str()));
    assert!(
        !on_disk(&root, "uploads/other.png"),
        "image of the row just replaced must not be orphaned"
    );
    assert!(on_disk(&root, &new));
}

#[tokio::test]
async fn update_of_missing_row_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let new = upload(&mut tracker, &root, "image", "new.png");
    let err = pipeline
        .update(42, payload(json!({"name": "X"})), tracker)
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::NotFound { id: 42, .. });
    assert!(!on_disk(&root, &new));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_owned_files_after_row() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = pipeline.tracker();
    let image = upload(&mut tracker, &root, "image", "cover.png");
    let category = pipeline
        .create(payload(json!({"name": "Drama"})), tracker)
        .await
        .unwrap();

    pipeline.delete(category.id).await.unwrap();
    assert!(!on_disk(&root, &image));
    assert_matches!(
        pipeline.get(category.id).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let categories = Pipeline::new(ds.categories.as_ref(), &root);

    let mut tracker = categories.tracker();
    let image = upload(&mut tracker, &root, "image", "cover.png");
    let category = categories
        .create(payload(json!({"name": "Drama"})), tracker)
        .await
        .unwrap();

    let movies = Pipeline::new(ds.movies.as_ref(), &root);
    let mut tracker = movies.tracker();
    upload(&mut tracker, &root, "image", "poster.png");
    movies
        .create(
            payload(json!({
                "name": "Dune",
                "description": "Sand",
                "videoSource": "LINK",
                "videoUrl": "https://cdn.example.com/v.mp4",
                "categoryId": category.id,
            })),
            tracker,
        )
        .await
        .unwrap();

    let err = categories.delete(category.id).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert!(on_disk(&root, &image), "files stay when the row stays");
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn partial_update_leaves_other_fields() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.users.as_ref(), &root);

    let user: User = pipeline
        .create(
            payload(json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"})),
            pipeline.tracker(),
        )
        .await
        .unwrap();
    assert_eq!(user.status.as_str(), "ACTIVE");

    let updated = pipeline
        .update(user.id, payload(json!({"status": "INACTIVE"})), pipeline.tracker())
        .await
        .unwrap();

    assert_eq!(updated.status.as_str(), "INACTIVE");
    assert_eq!(updated.name, user.name);
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.password_hash, user.password_hash);
}

#[tokio::test]
async fn password_is_hashed_and_never_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.users.as_ref(), &root);

    let user = pipeline
        .create(
            payload(json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"})),
            pipeline.tracker(),
        )
        .await
        .unwrap();

    assert_ne!(user.password_hash, "secret1");
    assert!(verify_password("secret1", &user.password_hash).unwrap());
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("secret1"));
    assert!(!json.contains("password"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let pipeline = Pipeline::new(ds.users.as_ref(), &root);
    let body = json!({"name": "Asha", "email": "asha@example.com", "password": "secret1"});

    pipeline
        .create(payload(body.clone()), pipeline.tracker())
        .await
        .unwrap();
    let err = pipeline
        .create(payload(body), pipeline.tracker())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg == "User with this email already exists");
}

#[tokio::test]
async fn admin_bootstrap_is_idempotent() {
    let ds = Datastore::memory();
    assert!(ds.admins.ensure("admin@example.com", "hash").await.unwrap());
    assert!(!ds.admins.ensure("admin@example.com", "other").await.unwrap());

    let creds = ds
        .admins
        .find_credentials("admin@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.password_hash, "hash");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pagination_arithmetic_and_empty_page() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    for i in 0..25 {
        seed_category(&ds, &format!("Category {i:02}")).await;
    }
    let pipeline = Pipeline::new(ds.categories.as_ref(), &root);

    let first = pipeline
        .list(&ListQuery::paged(Some(1), Some(10)).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total, 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].name, "Category 24", "newest first");

    let last = pipeline
        .list(&ListQuery::paged(Some(3), Some(10)).unwrap())
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);

    let err = pipeline
        .list(&ListQuery::paged(Some(4), Some(10)).unwrap())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NoResults(msg) if msg == "No categories found");
}

#[tokio::test]
async fn search_and_filters_narrow_results() {
    let dir = tempfile::tempdir().unwrap();
    let root = upload_root(&dir);
    let ds = Datastore::memory();
    let drama = seed_category(&ds, "Drama").await;
    let comedy = seed_category(&ds, "Comedy").await;
    let movies = Pipeline::new(ds.movies.as_ref(), &root);

    for (name, category, status) in [
        ("Dune", drama.id, "PUBLISHED"),
        ("Dune Part Two", drama.id, "PENDING"),
        ("Airplane!", comedy.id, "PUBLISHED"),
    ] {
        let mut tracker = movies.tracker();
        upload(&mut tracker, &root, "image", &format!("{}.png", name.len()));
        movies
            .create(
                payload(json!({
                    "name": name,
                    "description": "d",
                    "videoSource": "LINK",
                    "videoUrl": "https://cdn.example.com/v.mp4",
                    "status": status,
                    "categoryId": category,
                })),
                tracker,
            )
            .await
            .unwrap();
    }

    let query = ListQuery::default().with_search(Some("dune"));
    assert_eq!(movies.list(&query).await.unwrap().total, 2);

    let query = ListQuery::default()
        .with_search(Some("dune"))
        .with_filter(&["status", "categoryId"], "status", "PUBLISHED")
        .unwrap();
    let page = movies.list(&query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Dune");

    let query = ListQuery::default()
        .with_filter(&["status", "categoryId"], "categoryId", &comedy.id.to_string())
        .unwrap();
    assert_eq!(movies.list(&query).await.unwrap().items[0].name, "Airplane!");

    let all = movies.list_all(ListQuery::all()).await.unwrap();
    assert_eq!(all.len(), 3);
}
