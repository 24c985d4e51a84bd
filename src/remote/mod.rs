//! # Remote Store Interface
//!
//! The seam between the sync orchestrator and the authoritative remote
//! store. Two write endpoints exist: canonical sensor readings and
//! auxiliary note documents. The engine is generic over this trait so tests
//! can substitute an in-memory remote.

pub mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::PendingReading;

pub use http::HttpRemoteStore;

/// Fixed provenance tag marking a reading as manually captured in the field
pub const SOURCE_MANUAL: &str = "manual";

/// Canonical reading payload for the remote readings endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingUpload {
    /// Equipment reference
    pub equipment_id: String,
    /// Sensor type (the engine's reading type)
    pub sensor_type: String,
    /// Measured value
    pub value: f64,
    /// Unit of measure
    pub unit: String,
    /// Capture timestamp, RFC 3339 UTC
    pub captured_at: String,
    /// Capture provenance, always [`SOURCE_MANUAL`] for this engine
    pub source: String,
}

impl ReadingUpload {
    /// Build the canonical upload payload for a pending reading.
    ///
    /// Notes are deliberately excluded: they travel via the auxiliary
    /// document write, not the canonical measurement.
    pub fn from_reading(reading: &PendingReading) -> Self {
        Self {
            equipment_id: reading.equipment_id.clone(),
            sensor_type: reading.reading_type.clone(),
            value: reading.value,
            unit: reading.unit.clone(),
            captured_at: reading.captured_at.to_rfc3339(),
            source: SOURCE_MANUAL.to_string(),
        }
    }
}

/// Auxiliary document payload for the remote documents endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentUpload {
    /// Equipment reference
    pub equipment_id: String,
    /// Synthetic file name derived from the reading
    pub file_name: String,
    /// Concatenated notes body
    pub content: String,
    /// Fixed category tag for downstream filtering
    pub category: String,
}

/// Write access to the authoritative remote store
pub trait RemoteStore: Send + Sync {
    /// Submit a canonical reading
    fn submit_reading(
        &self,
        reading: &ReadingUpload,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Submit an auxiliary note document
    fn submit_document(
        &self,
        document: &DocumentUpload,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}
