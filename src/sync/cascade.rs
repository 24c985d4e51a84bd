//! # Secondary Derived-Write Cascade
//!
//! For each successfully synced reading carrying operator annotations, one
//! best-effort auxiliary document write to the remote store. Failure here is
//! logged and swallowed: the document is supplementary metadata, not the
//! primary measurement, so it never affects the run outcome and is never
//! retried independently.

use crate::model::PendingReading;
use crate::remote::{DocumentUpload, RemoteStore};

/// Fixed category tag on every cascaded note document
pub const NOTE_CATEGORY: &str = "field-notes";

/// Build the auxiliary document for a reading's annotations
pub fn document_for(reading: &PendingReading) -> DocumentUpload {
    let file_name = format!(
        "{}-reading-{}.txt",
        reading.reading_type,
        reading.captured_at.format("%Y%m%d%H%M%S")
    );

    let mut parts = Vec::new();
    if let Some(notes) = reading.notes.as_deref() {
        if !notes.trim().is_empty() {
            parts.push(notes.trim().to_string());
        }
    }
    if let Some(location) = reading.location_notes.as_deref() {
        if !location.trim().is_empty() {
            parts.push(format!("Location: {}", location.trim()));
        }
    }

    DocumentUpload {
        equipment_id: reading.equipment_id.clone(),
        file_name,
        content: parts.join("\n"),
        category: NOTE_CATEGORY.to_string(),
    }
}

/// Attempt the document write for a synced reading, exactly once.
///
/// Isolated from the caller's result channel: any failure is logged at warn
/// level and dropped.
pub(crate) async fn dispatch<R: RemoteStore>(remote: &R, reading: &PendingReading) {
    let document = document_for(reading);
    if let Err(e) = remote.submit_document(&document).await {
        tracing::warn!(
            reading_id = %reading.id,
            equipment_id = %reading.equipment_id,
            error = %e,
            "note document write failed; dropping"
        );
    }
}
