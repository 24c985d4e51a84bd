//! # Sync State and Notifications
//!
//! The observable engine state the UI renders its offline/sync indicator
//! from, and the per-run notification mapping for user-facing toasts.

use serde::Serialize;

use crate::model::SyncRunResult;

/// Current synchronization state
///
/// `unsynced_count` is always recomputed from the local store after a run,
/// never maintained as a running tally, so it cannot drift from the source
/// of truth.
#[derive(Debug, Clone, Serialize)]
pub struct SyncState {
    /// Current connectivity as reported by the platform
    pub is_online: bool,
    /// Whether a sync run is currently executing
    pub is_syncing: bool,
    /// Readings awaiting remote confirmation
    pub unsynced_count: i64,
    /// Last successful sync timestamp (RFC 3339)
    pub last_sync: Option<String>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            is_online: false,
            is_syncing: false,
            unsynced_count: 0,
            last_sync: None,
        }
    }
}

/// User-facing outcome of a completed sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotification {
    /// At least one reading was confirmed remotely
    Synced {
        /// Readings confirmed this run
        success_count: usize,
        /// Readings that failed and remain pending
        failure_count: usize,
    },
    /// Nothing succeeded and at least one reading failed
    Failed {
        /// Readings that failed and remain pending
        failure_count: usize,
    },
}

impl SyncNotification {
    /// Map a run result to its notification, if any.
    ///
    /// A run that did nothing (empty backlog) surfaces nothing.
    pub fn from_run(result: &SyncRunResult) -> Option<Self> {
        if result.success_count > 0 {
            Some(Self::Synced {
                success_count: result.success_count,
                failure_count: result.failure_count,
            })
        } else if result.failure_count > 0 {
            Some(Self::Failed {
                failure_count: result.failure_count,
            })
        } else {
            None
        }
    }

    /// Toast-style message text
    pub fn message(&self) -> String {
        match self {
            Self::Synced {
                success_count,
                failure_count: 0,
            } => format!("Synced {} reading(s)", success_count),
            Self::Synced {
                success_count,
                failure_count,
            } => format!(
                "Synced {} reading(s), {} failed and will retry",
                success_count, failure_count
            ),
            Self::Failed { failure_count } => format!(
                "Sync failed for {} reading(s); they remain pending",
                failure_count
            ),
        }
    }
}
