//! FieldSync - Offline Capture and Synchronization Engine
//!
//! FieldSync is the offline-first subsystem of a facilities maintenance
//! application: technicians record equipment sensor readings in the field,
//! sometimes without connectivity. Readings are captured durably on device,
//! survive app restarts, and are reconciled at-least-once with the
//! authoritative remote store when connectivity returns.
//!
//! # Overview
//!
//! This library provides:
//! - Durable local persistence of pending readings (SQLite via sqlx)
//! - An equipment read-through cache so capture works fully offline
//! - Connectivity-driven sync scheduling with per-record retry accounting
//! - Best-effort secondary note documents for synced readings
//! - Observable engine state for offline/sync indicators
//!
//! # Module Structure
//!
//! - **`store`** - Durable Local Store (readings, equipment cache, app state)
//! - **`sync`** - Sync orchestrator, connectivity monitor, cascade, metrics
//! - **`remote`** - Remote store trait and HTTP client
//! - **`model`** - Core data structures
//! - **`config`** - Engine configuration
//! - **`error`** - Error taxonomy
//!
//! # Usage
//!
//! ```rust,no_run
//! use fieldsync::config::Config;
//! use fieldsync::model::ReadingDraft;
//! use fieldsync::remote::HttpRemoteStore;
//! use fieldsync::store::LocalStore;
//! use fieldsync::sync::SyncEngine;
//!
//! # async fn example() -> Result<(), fieldsync::error::SyncError> {
//! let config = Config::default();
//! let store = LocalStore::open(config.db_path()).await?;
//! let remote = HttpRemoteStore::new(config.clone());
//!
//! let engine = SyncEngine::new(store, remote, &config, true);
//! engine.start().await;
//!
//! let id = engine
//!     .capture_reading(ReadingDraft {
//!         equipment_id: "eq-1".to_string(),
//!         reading_type: "temperature".to_string(),
//!         value: 72.0,
//!         unit: "F".to_string(),
//!         notes: Some("bearing noise".to_string()),
//!         location_notes: None,
//!     })
//!     .await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Semantics
//!
//! The engine is deliberately at-least-once: losing a field-captured reading
//! is worse than re-presenting it for a retry. A record that succeeds
//! remotely but is not marked synced locally (process killed between the
//! two steps) will be retried and may be double-written remotely; the remote
//! write carries no client-id dedup key. Secondary note documents are weaker
//! still: one attempt, failure logged and dropped.

/// Engine configuration
pub mod config;

/// Error taxonomy
pub mod error;

/// Core data structures
pub mod model;

/// Remote store trait and HTTP client
pub mod remote;

/// Durable local store
pub mod store;

/// Sync orchestrator and connectivity monitoring
pub mod sync;

pub use config::Config;
pub use error::SyncError;
pub use model::{CachedEquipment, EquipmentInfo, PendingReading, ReadingDraft, SyncRunResult};
pub use store::LocalStore;
pub use sync::{SyncEngine, SyncNotification, SyncState};
