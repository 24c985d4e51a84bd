//! # Pending Reading Operations
//!
//! Persistence and sync bookkeeping for locally captured readings. A reading
//! is owned by the local store until `mark_synced` flips it; the orchestrator
//! only ever sees rows with `synced = 0`, served by the secondary index.
//!
//! ## Invariants
//!
//! - `store_reading` never blocks on network and always succeeds unless the
//!   store itself is unavailable
//! - a synced reading is never re-submitted; its retry count is frozen
//! - readings are never deleted here; removal is a separate administrative
//!   operation outside this engine

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::SyncError;
use crate::model::{PendingReading, ReadingDraft};

use super::{LocalStore, Result};

impl LocalStore {
    /// Persist a captured reading
    ///
    /// Assigns a fresh client id and capture timestamp, starts the record
    /// unsynced with a zero retry count, and returns the id.
    pub async fn store_reading(&self, draft: ReadingDraft) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let captured_at = Utc::now();

        sqlx::query(
            "INSERT INTO readings (
                id, equipment_id, reading_type, value, unit,
                notes, location_notes, captured_at, synced, retry_count
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0)",
        )
        .bind(id.to_string())
        .bind(&draft.equipment_id)
        .bind(&draft.reading_type)
        .bind(draft.value)
        .bind(&draft.unit)
        .bind(draft.notes.as_deref())
        .bind(draft.location_notes.as_deref())
        .bind(captured_at.to_rfc3339())
        .execute(self.pool())
        .await?;

        tracing::debug!(%id, equipment_id = %draft.equipment_id, "stored pending reading");
        Ok(id)
    }

    /// Get all readings awaiting remote confirmation
    ///
    /// Served by the `synced` index; order is index-scan order and callers
    /// must not rely on it.
    pub async fn get_unsynced(&self) -> Result<Vec<PendingReading>> {
        let rows = sqlx::query(
            "SELECT id, equipment_id, reading_type, value, unit,
                    notes, location_notes, captured_at, synced, retry_count
             FROM readings WHERE synced = 0",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(read_row).collect()
    }

    /// Get a single reading by id
    pub async fn get_reading(&self, id: Uuid) -> Result<PendingReading> {
        let row = sqlx::query(
            "SELECT id, equipment_id, reading_type, value, unit,
                    notes, location_notes, captured_at, synced, retry_count
             FROM readings WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| SyncError::record_not_found(id.to_string()))?;

        read_row(&row)
    }

    /// Mark a reading as confirmed by the remote store
    ///
    /// Flips `synced` for exactly one record. Fails with `RecordNotFound` if
    /// the id is absent, which is a caller logic error. Calling this on an
    /// already-synced record is a no-op, not an error.
    pub async fn mark_synced(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE readings SET synced = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(SyncError::record_not_found(id.to_string()));
        }
        Ok(())
    }

    /// Record one failed remote-write attempt
    ///
    /// Atomic single-statement increment; fails with `RecordNotFound` if the
    /// id is absent.
    pub async fn increment_retry_count(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE readings SET retry_count = retry_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(SyncError::record_not_found(id.to_string()));
        }
        Ok(())
    }

    /// Number of readings awaiting remote confirmation
    pub async fn get_unsynced_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM readings WHERE synced = 0")
            .fetch_one(self.pool())
            .await?;
        Ok(count.0)
    }

    /// Total number of readings stored locally
    pub async fn get_reading_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM readings")
            .fetch_one(self.pool())
            .await?;
        Ok(count.0)
    }
}

/// Map a database row to a PendingReading
fn read_row(row: &sqlx::sqlite::SqliteRow) -> Result<PendingReading> {
    let id: String = row.try_get("id")?;
    let captured_at: String = row.try_get("captured_at")?;
    let synced: i32 = row.try_get("synced")?;

    Ok(PendingReading {
        id: Uuid::parse_str(&id)
            .map_err(|e| SyncError::store_unavailable(format!("corrupt reading id: {}", e)))?,
        equipment_id: row.try_get("equipment_id")?,
        reading_type: row.try_get("reading_type")?,
        value: row.try_get("value")?,
        unit: row.try_get("unit")?,
        notes: row.try_get("notes")?,
        location_notes: row.try_get("location_notes")?,
        captured_at: DateTime::parse_from_rfc3339(&captured_at)
            .map_err(|e| SyncError::store_unavailable(format!("corrupt timestamp: {}", e)))?
            .with_timezone(&Utc),
        synced: synced != 0,
        retry_count: row.try_get("retry_count")?,
    })
}
