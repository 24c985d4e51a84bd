//! Engine Error Types
//!
//! This module defines the error taxonomy for the capture-and-sync engine.
//! Each variant corresponds to a distinct failure class with its own
//! propagation policy.
//!
//! # Error Categories
//!
//! - `StoreUnavailable` - local persistence denied or corrupted; fatal, surfaced once at open
//! - `RecordNotFound` - a mutation targeted a record that does not exist; a caller logic error
//! - `RemoteWriteFailed` - expected per-record condition; drives retry accounting
//! - `SecondaryWriteFailed` - auxiliary document write failed; logged and swallowed
//!
//! # Usage
//!
//! ```rust
//! use fieldsync::error::SyncError;
//!
//! let error = SyncError::remote_write("connection reset by peer");
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Errors produced by the capture-and-sync engine
#[derive(Debug, Error)]
pub enum SyncError {
    /// The local store could not be opened or a storage operation failed
    #[error("local store unavailable: {message}")]
    StoreUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// A mutation targeted a record id that is not present in the store
    #[error("record not found: {id}")]
    RecordNotFound {
        /// The id that was not found
        id: String,
    },

    /// The remote write for a pending reading failed
    #[error("remote write failed: {message}")]
    RemoteWriteFailed {
        /// Human-readable error message
        message: String,
    },

    /// The auxiliary document write for a synced reading failed
    #[error("secondary document write failed: {message}")]
    SecondaryWriteFailed {
        /// Human-readable error message
        message: String,
    },
}

impl SyncError {
    /// Create a new store-unavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a new record-not-found error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Create a new remote-write error
    pub fn remote_write(message: impl Into<String>) -> Self {
        Self::RemoteWriteFailed {
            message: message.into(),
        }
    }

    /// Create a new secondary-write error
    pub fn secondary_write(message: impl Into<String>) -> Self {
        Self::SecondaryWriteFailed {
            message: message.into(),
        }
    }
}

/// Storage failures map onto the engine taxonomy: a missing row is a caller
/// logic error, everything else means the store itself is unusable.
impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::record_not_found("<unknown>"),
            other => Self::store_unavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::remote_write(err.to_string())
    }
}
