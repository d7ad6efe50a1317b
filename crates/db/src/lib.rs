//! Persistence for the OTT content backend.
//!
//! - [`models`]: row structs, create/update DTOs, validation schemas and
//!   entity metadata, one module per content type
//! - [`repositories`]: Postgres implementations of the core repository traits
//! - [`memory`]: an in-process store with the same semantics, used by tests
//!   and database-less local runs
//! - [`Datastore`]: the set of repositories handed to the API layer

use sqlx::postgres::PgPoolOptions;

pub mod datastore;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;

pub use datastore::Datastore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
