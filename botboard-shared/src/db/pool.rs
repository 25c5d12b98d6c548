//! Database connection pool management
//!
//! This module provides the SQLite connection pool used by the whole
//! application. The pool enables the `foreign_keys` pragma on every
//! connection because the schema relies on `ON DELETE CASCADE` for
//! bot/button webhook links.
//!
//! # Example
//!
//! ```no_run
//! use botboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), sqlx::Error> {
//! let config = DatabaseConfig {
//!     url: "sqlite:botboard.db".to_string(),
//!     ..Default::default()
//! };
//!
//! let pool = create_pool(&config).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the database connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite:botboard.db" or "sqlite::memory:")
    pub url: String,

    /// Maximum number of connections in the pool
    ///
    /// In-memory databases must keep this at 1: each new connection to
    /// `sqlite::memory:` would otherwise open its own empty database.
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            acquire_timeout_seconds: 30,
        }
    }
}

/// Creates and initializes a SQLite connection pool
///
/// The database file is created if missing, and a health check is performed
/// before the pool is returned.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the database cannot be opened,
/// or the health check fails.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Creating database connection pool"
    );

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// Executes a trivial query to verify the database is reachable.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}
