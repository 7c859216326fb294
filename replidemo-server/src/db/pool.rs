//! Database connection pool management
//!
//! One sqlx `PgPool` per target. The pool is the only synchronisation the
//! handles rely on.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::{ConnectionSettings, PoolConfig};

/// Create a pool for one target and open its first connection.
///
/// # Errors
///
/// Returns an error if the server cannot be reached or rejects the login.
pub async fn create_pool(
    settings: &ConnectionSettings,
    pool: &PoolConfig,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .acquire_timeout(pool.acquire_timeout())
        .connect_with(settings.connect_options())
        .await
}

/// Create a pool from a connection URL with default pool options.
///
/// Used by `DATABASE_URL`-driven tests.
pub async fn create_pool_from_url(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let defaults = PoolConfig::default();
    PgPoolOptions::new()
        .max_connections(defaults.max_connections)
        .acquire_timeout(defaults.acquire_timeout())
        .connect(database_url)
        .await
}
