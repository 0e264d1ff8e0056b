//! Database connection management.
//!
//! Builds the `SQLx` SQLite connection pool used by all store modules.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Open a SQLite connection pool at `path`.
///
/// The database file is created if missing. Pass `:memory:` for an in-memory
/// database (used throughout the test suites).
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is not a valid connection string
/// or the pool cannot be established.
pub async fn open_pool(path: &str) -> Result<Pool<Sqlite>> {
    let connect_options = SqliteConnectOptions::from_str(path)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to connect: {e}")))?;

    tracing::info!("Database pool created at {}", path);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_pool() {
        let pool = open_pool(":memory:").await.expect("create pool");

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("pool is usable");
    }
}
