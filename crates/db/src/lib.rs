//! Taskboard persistence layer.
//!
//! Connection pool setup, embedded migrations, row models, and the
//! zero-sized repositories used by the engine and the HTTP layer.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

/// Shared by the HTTP handlers and the recurrence engine, which opens its
/// transactions from it.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
///
/// Each engine operation holds one connection for its whole transaction,
/// including while it waits on a template row lock.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query. Backs `GET /health`.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`, including the
/// `uq_tasks_one_pending_instance` partial index.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
