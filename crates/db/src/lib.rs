//! Database access layer for the altar analytics backend.
//!
//! Exposes pool construction helpers, the entity models, and the
//! analytics repositories. Repositories are zero-sized structs whose
//! async methods take `&PgPool` as the first argument -- dependencies
//! are injected per call, never held in module-level globals.

use std::time::Duration;

pub mod identity;
pub mod models;
pub mod repositories;

/// Convenience alias used across crates.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool against the given Postgres URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by the health endpoint and at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
