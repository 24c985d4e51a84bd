//! # Durable Local Store
//!
//! Crash-durable SQLite persistence for pending readings, the equipment
//! read-through cache, and opaque app-state entries. This is the foundation
//! of offline-first capture: a reading stored here survives process restarts
//! and is visible to the sync orchestrator until it is confirmed remotely.
//!
//! ## Architecture
//!
//! The store holds three logical collections inside one database file:
//! - **Readings**: locally captured measurements with sync bookkeeping
//! - **Equipment Cache**: full-replace snapshot for offline lookups
//! - **App State**: arbitrary key/value pairs (last sync time, etc.)
//!
//! ## Key Components
//!
//! - `LocalStore`: connection pool and schema management
//! - `schema.rs`: DDL, schema version constants, and migration helpers
//! - `readings.rs`: pending-reading persistence and sync bookkeeping
//! - `equipment.rs`: equipment cache operations
//! - `app_state.rs`: key/value state operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldsync::store::LocalStore;
//! use fieldsync::model::ReadingDraft;
//!
//! # async fn example() -> Result<(), fieldsync::error::SyncError> {
//! let store = LocalStore::open("/tmp/fieldsync.db").await?;
//!
//! let id = store
//!     .store_reading(ReadingDraft {
//!         equipment_id: "eq-1".to_string(),
//!         reading_type: "temperature".to_string(),
//!         value: 72.0,
//!         unit: "F".to_string(),
//!         notes: None,
//!         location_notes: None,
//!     })
//!     .await?;
//!
//! assert_eq!(store.get_unsynced_count().await?, 1);
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

pub mod app_state;
pub mod equipment;
pub mod readings;
pub mod schema;

use std::path::Path;

use sqlx::SqlitePool;

use crate::error::SyncError;

/// Result type for local store operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Local database connection manager
///
/// Manages the SQLite connection pool and provides record-scoped operations
/// for capture and synchronization. Every mutation is a single-record
/// read-modify-write; there are no cross-record invariants to protect, so
/// capture calls and orchestrator runs may interleave freely.
#[derive(Debug)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open or create the local database at the given path
    ///
    /// Idempotent: creates the file and schema on first use, is a no-op on an
    /// already-initialized database. Uses WAL mode for better concurrency.
    /// Fails with `StoreUnavailable` if the platform denies storage access.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::store_unavailable(e.to_string()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&database_url).await?;

        // WAL mode and pragma tuning
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;
        sqlx::query("PRAGMA temp_store=MEMORY").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Open the database at the platform default location
    pub async fn open_default() -> Result<Self> {
        Self::open(crate::config::Config::default().db_path()).await
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if schema::needs_migration(current_version.0) {
            for version in schema::get_pending_migrations(current_version.0) {
                self.apply_migration(version).await?;
            }
        }

        Ok(())
    }

    /// Apply a single migration and record it
    async fn apply_migration(&self, version: i32) -> Result<()> {
        tracing::info!(version, "applying local store migration");

        match version {
            1 => {
                sqlx::raw_sql(schema::SCHEMA_V1).execute(&self.pool).await?;
            }
            other => {
                return Err(SyncError::store_unavailable(format!(
                    "unknown schema migration version {}",
                    other
                )));
            }
        }

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get connection pool reference
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get store statistics
    ///
    /// Row counts per collection, for diagnostics and status displays.
    pub async fn stats(&self) -> Result<StoreStats> {
        let reading_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM readings")
            .fetch_one(&self.pool)
            .await?;

        let unsynced_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM readings WHERE synced = 0")
                .fetch_one(&self.pool)
                .await?;

        let equipment_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment_cache")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            reading_count: reading_count.0 as u64,
            unsynced_count: unsynced_count.0 as u64,
            equipment_count: equipment_count.0 as u64,
        })
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Total readings stored locally
    pub reading_count: u64,
    /// Readings still awaiting remote confirmation
    pub unsynced_count: u64,
    /// Cached equipment entries
    pub equipment_count: u64,
}
