//! leakscout persistence layer.
//!
//! Provides SQLite access through `SQLx` with embedded, versioned migrations.
//! Each table has its own module of free store functions taking a
//! `&Pool<Sqlite>`; the [`Database`] wrapper handles pool creation and
//! migration on startup.
//!
//! # Example
//!
//! ```ignore
//! use leakscout_db::Database;
//!
//! let db = Database::new("leakscout.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod code_results;
pub mod connection;
pub mod error;
pub mod migrations;
pub mod projects;
pub mod rules;
pub mod tokens;

// Re-export commonly used types
pub use code_results::{CodeResult, NewCodeResult, TextMatch};
pub use error::{DatabaseError, Result};
pub use projects::{NewProject, Project};
pub use rules::Rule;
pub use tokens::Token;

/// High-level database interface with pooling and migrations.
#[derive(Debug)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: &str) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// Call this after creating a new instance to ensure the schema is up to
    /// date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
