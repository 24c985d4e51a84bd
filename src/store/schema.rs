//! Database Schema Definitions
//!
//! Schema DDL, version constants, and migration helpers for the local store.

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Schema migration versions
pub const MIGRATION_VERSIONS: &[i32] = &[1];

/// Initial schema: the three logical collections plus their secondary indexes.
///
/// Timestamps are stored as RFC 3339 text. `synced` is an integer flag so the
/// partial-filter index can serve `get_unsynced` without a full scan.
pub const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS readings (
    id TEXT PRIMARY KEY,
    equipment_id TEXT NOT NULL,
    reading_type TEXT NOT NULL,
    value REAL NOT NULL,
    unit TEXT NOT NULL,
    notes TEXT,
    location_notes TEXT,
    captured_at TEXT NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0,
    retry_count INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_readings_equipment ON readings(equipment_id);
CREATE INDEX IF NOT EXISTS idx_readings_synced ON readings(synced);
CREATE INDEX IF NOT EXISTS idx_readings_captured_at ON readings(captured_at);

CREATE TABLE IF NOT EXISTS equipment_cache (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    cached_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_equipment_cached_at ON equipment_cache(cached_at);

CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Check if database needs migration
pub fn needs_migration(current_version: i32) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Get pending migrations
pub fn get_pending_migrations(current_version: i32) -> Vec<i32> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}
