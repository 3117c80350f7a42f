//! MySQL access to the tenant directory in the main database.

pub mod config;
pub mod models;
pub mod repositories;

use sqlx::mysql::MySqlPoolOptions;

use crate::config::MainDbConfig;

pub type DbPool = sqlx::MySqlPool;

/// Create a connection pool against the main database.
///
/// The pool is small on purpose: directory lookups are short-lived,
/// one per resolution. `acquire_timeout` bounds the wait for a
/// connection so a down directory server fails fast instead of
/// hanging requests.
pub async fn create_pool(config: &MainDbConfig) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.query_timeout)
        .connect_with(config.connect_options())
        .await
}

/// Verify the main database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
