//! Repository tests against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a server the test user may create
//! databases on: `cargo test -p ott-db -- --ignored`.

use assert_matches::assert_matches;
use ott_core::enums::{MovieStatus, UserStatus, VideoSource};
use ott_core::error::CoreError;
use ott_core::pagination::ListQuery;
use ott_core::repository::{AccountRepository, AdminRepository, Repository};
use ott_db::models::category::{CreateCategory, UpdateCategory};
use ott_db::models::movie::{CreateMovie, UpdateMovie, VideoDescriptor};
use ott_db::models::package::{CreatePackage, PackageInclude};
use ott_db::models::service::CreateService;
use ott_db::models::user::CreateUser;
use ott_db::repositories::{
    AdminRepo, CategoryRepo, MovieRepo, PackageRepo, ServiceRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_category(name: &str) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        image_url: None,
    }
}

fn new_movie(name: &str, category_id: i64) -> CreateMovie {
    CreateMovie {
        name: name.to_string(),
        description: "A film".to_string(),
        image_url: format!("uploads/{name}.png"),
        video_source: VideoSource::Link,
        video_path: None,
        video_url: Some("https://cdn.example.com/film.mp4".to_string()),
        status: MovieStatus::Pending,
        category_id,
    }
}

fn new_service(name: &str) -> CreateService {
    CreateService {
        name: name.to_string(),
        description: "Blood panel".to_string(),
        image: None,
        amount: 500.0,
        discount: Some(50.0),
        fasting_time: None,
        result_duration: Some("24h".to_string()),
        sample_type: "Blood".to_string(),
        age_group: "Adult".to_string(),
        home_sample_collection: None,
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn category_crud(pool: PgPool) {
    let repo = CategoryRepo::new(pool);
    let created = repo.create(&new_category("Drama")).await.unwrap();
    assert_eq!(repo.find_by_id(created.id).await.unwrap().name, "Drama");

    let updated = repo
        .update(
            created.id,
            &UpdateCategory {
                image_url: Some("uploads/drama.png".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.previous.image_url, None);
    assert_eq!(updated.current.name, "Drama");
    assert_eq!(updated.current.image_url.as_deref(), Some("uploads/drama.png"));

    repo.delete(created.id).await.unwrap();
    assert_matches!(
        repo.find_by_id(created.id).await,
        Err(CoreError::NotFound { entity: "Category", .. })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_category_name_is_conflict(pool: PgPool) {
    let repo = CategoryRepo::new(pool);
    repo.create(&new_category("Drama")).await.unwrap();
    let err = repo.create(&new_category("Drama")).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg == "Category with this name already exists");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn search_is_case_insensitive_and_literal(pool: PgPool) {
    let repo = CategoryRepo::new(pool);
    for name in ["Drama", "Docudrama", "Comedy", "100% Action"] {
        repo.create(&new_category(name)).await.unwrap();
    }

    let (rows, total) = repo
        .find_many(&ListQuery::default().with_search(Some("DRAMA")))
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows[0].name, "Docudrama", "newest first");

    let (rows, _) = repo
        .find_many(&ListQuery::default().with_search(Some("0%")))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn movie_with_missing_category_is_reference_error(pool: PgPool) {
    let repo = MovieRepo::new(pool);
    let err = repo.create(&new_movie("Dune", 9_999)).await.unwrap_err();
    assert_matches!(err, CoreError::Reference(msg) if msg == "The specified category ID does not exist");
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn movie_video_switches_between_link_and_upload(pool: PgPool) {
    let category = CategoryRepo::new(pool.clone())
        .create(&new_category("Drama"))
        .await
        .unwrap();
    let repo = MovieRepo::new(pool);
    let movie = repo.create(&new_movie("Dune", category.id)).await.unwrap();
    assert_eq!(movie.video.source(), VideoSource::Link);

    let updated = repo
        .update(
            movie.id,
            &UpdateMovie {
                video_source: Some(VideoSource::Upload),
                video_path: Some("uploads/dune.mp4".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .current;
    assert_eq!(
        updated.video,
        VideoDescriptor::Upload {
            path: "uploads/dune.mp4".into()
        }
    );

    let status_only = repo
        .update(
            movie.id,
            &UpdateMovie {
                status: Some(MovieStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(status_only.previous.video, updated.video);
    assert_eq!(status_only.current.video, updated.video);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn referenced_category_delete_is_conflict(pool: PgPool) {
    let categories = CategoryRepo::new(pool.clone());
    let category = categories.create(&new_category("Drama")).await.unwrap();
    MovieRepo::new(pool)
        .create(&new_movie("Dune", category.id))
        .await
        .unwrap();

    let err = categories.delete(category.id).await.unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
    assert!(categories.find_by_id(category.id).await.is_ok());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn movie_filters_by_status(pool: PgPool) {
    let category = CategoryRepo::new(pool.clone())
        .create(&new_category("Drama"))
        .await
        .unwrap();
    let repo = MovieRepo::new(pool);
    repo.create(&new_movie("Dune", category.id)).await.unwrap();
    repo.create(&CreateMovie {
        status: MovieStatus::Published,
        ..new_movie("Arrival", category.id)
    })
    .await
    .unwrap();

    let query = ListQuery::default()
        .with_filter(&["status", "categoryId"], "status", "PUBLISHED")
        .unwrap();
    let (rows, total) = repo.find_many(&query).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "Arrival");
}

// ---------------------------------------------------------------------------
// Services and packages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn package_includes_round_trip_as_json(pool: PgPool) {
    let service = ServiceRepo::new(pool.clone())
        .create(&new_service("Full body"))
        .await
        .unwrap();
    let repo = PackageRepo::new(pool);
    let created = repo
        .create(&CreatePackage {
            name: "Gold".into(),
            description: "Everything".into(),
            price: 1200.0,
            discount: Some(10.0),
            image: None,
            includes: vec![PackageInclude {
                title: "Blood".into(),
                description: "Panel".into(),
                items: vec!["CBC".into(), "Lipid".into()],
            }],
            faqs: Vec::new(),
            service_id: service.id,
        })
        .await
        .unwrap();

    let found = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(found.includes.len(), 1);
    assert_eq!(found.includes[0].items, ["CBC", "Lipid"]);
    assert!(found.faqs.is_empty());
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn user_credentials_lookup(pool: PgPool) {
    let repo = UserRepo::new(pool);
    repo.create(&CreateUser {
        name: "Asha".into(),
        email: "asha@example.com".into(),
        password_hash: "hash".into(),
        status: UserStatus::Active,
        image: None,
    })
    .await
    .unwrap();

    let creds = repo
        .find_credentials("asha@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.password_hash, "hash");
    assert_eq!(creds.status, Some(UserStatus::Active));
    assert!(repo.find_credentials("nobody@example.com").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn admin_ensure_is_idempotent(pool: PgPool) {
    let repo = AdminRepo::new(pool);
    assert!(repo.ensure("admin@example.com", "first").await.unwrap());
    assert!(!repo.ensure("admin@example.com", "second").await.unwrap());
    let creds = repo
        .find_credentials("admin@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.password_hash, "first");
}
