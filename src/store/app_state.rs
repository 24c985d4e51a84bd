//! # App State Operations
//!
//! Opaque key/value pairs persisted alongside the readings, plus the
//! convenience accessors for the last successful sync time.

use sqlx::Row;

use super::{LocalStore, Result};

/// App-state key for the last successful sync timestamp
const LAST_SYNC_TIME_KEY: &str = "last_sync_time";

impl LocalStore {
    /// Set an app-state value
    pub async fn set_app_state(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO app_state (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get an app-state value
    pub async fn get_app_state(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM app_state WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    /// Get the last successful sync timestamp
    pub async fn get_last_sync_time(&self) -> Result<Option<String>> {
        self.get_app_state(LAST_SYNC_TIME_KEY).await
    }

    /// Record the current time as the last successful sync timestamp
    pub async fn set_last_sync_time(&self) -> Result<()> {
        self.set_app_state(LAST_SYNC_TIME_KEY, &chrono::Utc::now().to_rfc3339())
            .await
    }
}
