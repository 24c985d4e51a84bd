//! # Equipment Cache Operations
//!
//! Full-replace snapshot of equipment metadata so the capture UI can resolve
//! equipment id -> name/location while offline. Each refresh clears all prior
//! entries and inserts the new set inside one transaction; a partial failure
//! never leaves a mix of old and new entries.

use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::error::SyncError;
use crate::model::{CachedEquipment, EquipmentInfo};

use super::{LocalStore, Result};

impl LocalStore {
    /// Replace the cached equipment set
    ///
    /// Clears the collection and inserts `list` with a fresh cache timestamp
    /// as a single transaction.
    pub async fn cache_equipment(&self, list: &[EquipmentInfo]) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM equipment_cache")
            .execute(&mut *tx)
            .await?;

        for item in list {
            sqlx::query(
                "INSERT INTO equipment_cache (id, name, location, cached_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(&item.location)
            .bind(&cached_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(count = list.len(), "refreshed equipment cache");
        Ok(())
    }

    /// Get all cached equipment entries
    pub async fn get_cached_equipment(&self) -> Result<Vec<CachedEquipment>> {
        let rows = sqlx::query(
            "SELECT id, name, location, cached_at FROM equipment_cache ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(equipment_row).collect()
    }

    /// Look up a single cached equipment entry by id
    pub async fn get_cached_equipment_by_id(&self, id: &str) -> Result<Option<CachedEquipment>> {
        let row = sqlx::query("SELECT id, name, location, cached_at FROM equipment_cache WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(equipment_row).transpose()
    }
}

/// Map a database row to a CachedEquipment
fn equipment_row(row: &sqlx::sqlite::SqliteRow) -> Result<CachedEquipment> {
    let cached_at: String = row.try_get("cached_at")?;
    Ok(CachedEquipment {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        cached_at: DateTime::parse_from_rfc3339(&cached_at)
            .map_err(|e| SyncError::store_unavailable(format!("corrupt timestamp: {}", e)))?
            .with_timezone(&Utc),
    })
}
