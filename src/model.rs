//! Core Data Structures
//!
//! Types owned by the capture-and-sync engine: pending readings awaiting
//! remote confirmation, cached equipment snapshots, and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A measurement captured in the field, as submitted by the capture UI.
///
/// The store assigns the id, capture timestamp, and sync bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingDraft {
    /// Equipment this reading belongs to (opaque reference, not validated locally)
    pub equipment_id: String,
    /// Kind of measurement (e.g. "temperature", "vibration")
    pub reading_type: String,
    /// Measured value
    pub value: f64,
    /// Unit of measure
    pub unit: String,
    /// Optional operator notes
    pub notes: Option<String>,
    /// Optional notes about the capture location
    pub location_notes: Option<String>,
}

/// A locally persisted measurement awaiting remote confirmation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingReading {
    /// Client-generated unique id, assigned at creation, immutable
    pub id: Uuid,
    /// Equipment this reading belongs to
    pub equipment_id: String,
    /// Kind of measurement
    pub reading_type: String,
    /// Measured value
    pub value: f64,
    /// Unit of measure
    pub unit: String,
    /// Optional operator notes
    pub notes: Option<String>,
    /// Optional notes about the capture location
    pub location_notes: Option<String>,
    /// When the reading was captured, assigned at capture time, immutable
    pub captured_at: DateTime<Utc>,
    /// False at creation, flips to true exactly once, never reverts
    pub synced: bool,
    /// Failed remote-write attempts so far; never reset, frozen at success
    pub retry_count: i32,
}

impl PendingReading {
    /// Whether this reading carries operator annotations that warrant
    /// the auxiliary document write after a successful sync.
    pub fn has_notes(&self) -> bool {
        let non_empty = |n: &Option<String>| n.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_empty(&self.notes) || non_empty(&self.location_notes)
    }
}

/// A cached equipment snapshot for offline id -> name/location resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedEquipment {
    /// Equipment id
    pub id: String,
    /// Display name
    pub name: String,
    /// Physical location description
    pub location: String,
    /// When this snapshot was written to the cache
    pub cached_at: DateTime<Utc>,
}

/// Equipment metadata as provided by the caller on a cache refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentInfo {
    /// Equipment id
    pub id: String,
    /// Display name
    pub name: String,
    /// Physical location description
    pub location: String,
}

/// Aggregate outcome of one orchestrator run. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRunResult {
    /// Readings confirmed by the remote store this run
    pub success_count: usize,
    /// Readings that failed their remote write this run
    pub failure_count: usize,
}
