//! SEOLens Database Layer
//!
//! Provides `SQLite` access for the records a scan leaves behind: the owning
//! site, the audit itself, and the latest crawl state of the page.
//!
//! # Example
//!
//! ```ignore
//! use seolens_db::Database;
//!
//! let db = Database::new("seolens.db").await?;
//! db.run_migrations().await?;
//! let site = seolens_db::sites::create_site(db.pool(), "user-1", "example.com", "https://example.com").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod audits;
pub mod error;
pub mod migrations;
pub mod pages;
pub mod scans;
pub mod sites;

// Re-export commonly used types
pub use audits::Audit;
pub use error::{DatabaseError, Result};
pub use pages::Page;
pub use scans::ScanRecord;
pub use sites::Site;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

const MEMORY_PATH: &str = ":memory:";

/// High-level database handle wrapping a `SQLx` connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (or create) a `SQLite` database.
    ///
    /// `:memory:` opens an ephemeral database on a single connection so every
    /// query sees the same data.
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .foreign_keys(true)
            .create_if_missing(true);

        let max_connections = if path_str == MEMORY_PATH { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Database pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Open an ephemeral database with the schema already applied.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the pool or migrations fail.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::new(MEMORY_PATH).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::in_memory().await.expect("create in-memory db");
        let version = migrations::get_schema_version(db.pool())
            .await
            .expect("get version");
        assert!(version > 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("seolens.db");

        let db = Database::new(&path).await.expect("create file db");
        db.run_migrations().await.expect("run migrations");
        sites::create_site(db.pool(), "owner-1", "example.com", "https://example.com")
            .await
            .expect("create site");
        db.close().await;

        let reopened = Database::new(&path).await.expect("reopen file db");
        let site = sites::find_site_by_domain(reopened.pool(), "owner-1", "example.com")
            .await
            .expect("query site");
        assert!(site.is_some());
    }
}
