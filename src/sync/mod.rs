//! # Sync Orchestrator
//!
//! The single authority that reconciles locally captured readings with the
//! authoritative remote store. On trigger it drains the unsynced backlog,
//! updates per-record status, and reports the aggregate outcome.
//!
//! ## Architecture
//!
//! The orchestrator coordinates several components:
//! - **Connectivity Monitor**: online/offline transitions as discrete triggers
//! - **Trigger Channel**: message-passing entry into the run state machine
//! - **Run Guard**: at most one sync run executes at a time
//! - **Sync State**: observable `is_online` / `is_syncing` / `unsynced_count`
//! - **Cascade**: best-effort note documents for synced readings
//! - **Metrics**: per-run counters and timings
//!
//! ## State machine
//!
//! `Idle -> Running -> Idle`. Triggers into `Running`: connectivity restored
//! with a non-zero backlog (after a short debounce), an explicit request, or
//! the startup drain. A trigger received while running is dropped, not
//! queued; this guard is the only mutex in the system. There is no mid-run
//! cancellation and no retry ceiling: a record stays pending until it
//! succeeds or is removed administratively.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldsync::config::Config;
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
//! // Capture works identically online and offline
//! # let draft = todo!();
//! let id = engine.capture_reading(draft).await?;
//!
//! // Platform connectivity callbacks feed the monitor
//! engine.set_online(false).await;
//! engine.set_online(true).await;
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod connectivity;
pub mod metrics;
pub mod state;

pub use connectivity::{ConnectivityMonitor, SyncTrigger};
pub use metrics::SyncMetrics;
pub use state::{SyncNotification, SyncState};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::error::SyncError;
use crate::model::{CachedEquipment, EquipmentInfo, ReadingDraft, SyncRunResult};
use crate::remote::{ReadingUpload, RemoteStore};
use crate::store::LocalStore;

/// Capacity of the notification fan-out channel
const NOTIFICATION_CAPACITY: usize = 16;

/// The sync orchestrator and engine facade
///
/// Cheap to clone; clones share the same store, state, and run guard.
#[derive(Debug)]
pub struct SyncEngine<R: RemoteStore> {
    store: Arc<LocalStore>,
    remote: Arc<R>,
    connectivity: Arc<ConnectivityMonitor>,
    state: Arc<RwLock<SyncState>>,
    metrics: Arc<RwLock<SyncMetrics>>,
    run_guard: Arc<Mutex<()>>,
    triggers: mpsc::UnboundedSender<SyncTrigger>,
    trigger_rx: Arc<std::sync::Mutex<Option<mpsc::UnboundedReceiver<SyncTrigger>>>>,
    notify_tx: broadcast::Sender<SyncNotification>,
    task: Arc<std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
    debounce: Duration,
}

impl<R: RemoteStore> Clone for SyncEngine<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
            connectivity: Arc::clone(&self.connectivity),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            run_guard: Arc::clone(&self.run_guard),
            triggers: self.triggers.clone(),
            trigger_rx: Arc::clone(&self.trigger_rx),
            notify_tx: self.notify_tx.clone(),
            task: Arc::clone(&self.task),
            debounce: self.debounce,
        }
    }
}

impl<R: RemoteStore> SyncEngine<R> {
    /// Create a new engine over an opened store and a remote client
    ///
    /// `initially_online` is the platform's reported connectivity at startup.
    pub fn new(store: LocalStore, remote: R, config: &Config, initially_online: bool) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let state = SyncState {
            is_online: initially_online,
            ..SyncState::default()
        };

        Self {
            store: Arc::new(store),
            remote: Arc::new(remote),
            connectivity: Arc::new(ConnectivityMonitor::new(initially_online, trigger_tx.clone())),
            state: Arc::new(RwLock::new(state)),
            metrics: Arc::new(RwLock::new(SyncMetrics::new())),
            run_guard: Arc::new(Mutex::new(())),
            triggers: trigger_tx,
            trigger_rx: Arc::new(std::sync::Mutex::new(Some(trigger_rx))),
            notify_tx,
            task: Arc::new(std::sync::Mutex::new(None)),
            debounce: config.sync_debounce(),
        }
    }

    /// Persist a captured reading
    ///
    /// Resolves once the reading is durable locally; never waits on network.
    pub async fn capture_reading(&self, draft: ReadingDraft) -> Result<Uuid, SyncError> {
        let id = self.store.store_reading(draft).await?;
        let unsynced = self.store.get_unsynced_count().await?;
        self.state.write().await.unsynced_count = unsynced;
        Ok(id)
    }

    /// Replace the equipment cache with a fresh list
    ///
    /// Called opportunistically whenever the caller has a current equipment
    /// list; lookups keep serving the previous snapshot until this succeeds.
    pub async fn refresh_equipment(&self, list: &[EquipmentInfo]) -> Result<(), SyncError> {
        self.store.cache_equipment(list).await
    }

    /// All cached equipment entries; identical online and offline
    pub async fn cached_equipment(&self) -> Result<Vec<CachedEquipment>, SyncError> {
        self.store.get_cached_equipment().await
    }

    /// Look up one cached equipment entry by id
    pub async fn cached_equipment_by_id(
        &self,
        id: &str,
    ) -> Result<Option<CachedEquipment>, SyncError> {
        self.store.get_cached_equipment_by_id(id).await
    }

    /// Report the platform connectivity state
    pub async fn set_online(&self, online: bool) {
        if self.connectivity.set_online(online) {
            self.state.write().await.is_online = online;
        }
    }

    /// Request an immediate sync run
    ///
    /// Fire-and-forget: the run happens on the engine task. Dropped if the
    /// engine has been stopped.
    pub fn sync_now(&self) {
        let _ = self.triggers.send(SyncTrigger::Manual);
    }

    /// Snapshot of the observable engine state
    pub async fn status(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Snapshot of the run metrics
    pub async fn metrics(&self) -> SyncMetrics {
        self.metrics.read().await.clone()
    }

    /// Subscribe to per-run notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotification> {
        self.notify_tx.subscribe()
    }

    /// Direct access to the local store
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Execute one sync run now, if none is in progress
    ///
    /// Returns `Ok(None)` when another run holds the guard; the trigger is
    /// dropped, not queued. Per-record failures are contained in the run;
    /// only a store-level failure propagates.
    pub async fn run_once(&self) -> Result<Option<SyncRunResult>, SyncError> {
        let guard = match self.run_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("sync run already in progress, trigger dropped");
                return Ok(None);
            }
        };

        self.state.write().await.is_syncing = true;
        self.metrics.write().await.record_run_start();

        let outcome = self.drain_backlog().await;
        // Republish the count from the source of truth, never from tallies
        let count = self.store.get_unsynced_count().await;

        {
            let mut state = self.state.write().await;
            state.is_syncing = false;
            if let Ok(count) = &count {
                state.unsynced_count = *count;
            }
            if let Ok(result) = &outcome {
                if result.success_count > 0 {
                    state.last_sync = Some(chrono::Utc::now().to_rfc3339());
                }
            }
        }
        drop(guard);

        let result = outcome?;
        let count = count?;

        if result.success_count > 0 {
            if let Err(e) = self.store.set_last_sync_time().await {
                tracing::error!(error = %e, "failed to persist last sync time");
            }
        }

        self.metrics.write().await.record_run(&result);

        tracing::info!(
            success = result.success_count,
            failed = result.failure_count,
            remaining = count,
            "sync run complete"
        );

        if let Some(notification) = SyncNotification::from_run(&result) {
            // No subscribers is fine
            let _ = self.notify_tx.send(notification);
        }

        Ok(Some(result))
    }

    /// Process every unsynced reading sequentially
    ///
    /// Per-record ordering: a record's bookkeeping write completes before the
    /// next record is attempted, which bounds the blast radius of any single
    /// failure. Run time scales linearly with the backlog; field backlogs are
    /// small, bounded by how long a technician was offline.
    async fn drain_backlog(&self) -> Result<SyncRunResult, SyncError> {
        let pending = self.store.get_unsynced().await?;
        tracing::info!(pending = pending.len(), "starting sync run");

        let mut result = SyncRunResult::default();

        for reading in &pending {
            let upload = ReadingUpload::from_reading(reading);
            match self.remote.submit_reading(&upload).await {
                Ok(()) => {
                    self.contain_bookkeeping(self.store.mark_synced(reading.id).await)?;
                    result.success_count += 1;

                    if reading.has_notes() {
                        cascade::dispatch(self.remote.as_ref(), reading).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        reading_id = %reading.id,
                        retry_count = reading.retry_count,
                        error = %e,
                        "remote write failed, reading stays pending"
                    );
                    self.contain_bookkeeping(self.store.increment_retry_count(reading.id).await)?;
                    result.failure_count += 1;
                }
            }
        }

        Ok(result)
    }

    /// Apply the propagation policy to a per-record bookkeeping result
    ///
    /// A missing record is a logic error: logged, run continues. Anything
    /// else means the store is unusable and aborts the run.
    fn contain_bookkeeping(&self, result: Result<(), SyncError>) -> Result<(), SyncError> {
        match result {
            Ok(()) => Ok(()),
            Err(SyncError::RecordNotFound { id }) => {
                tracing::error!(%id, "reading vanished during sync run");
                Ok(())
            }
            Err(other) => Err(other),
        }
    }
}

impl<R: RemoteStore + 'static> SyncEngine<R> {
    /// Start the engine task
    ///
    /// Consumes triggers from the connectivity monitor and explicit requests,
    /// and performs the startup drain when the store already holds unsynced
    /// readings while online. Calling `start` twice is a no-op.
    pub async fn start(&self) {
        let rx = self.trigger_rx.lock().expect("trigger receiver lock").take();
        let Some(mut rx) = rx else {
            tracing::warn!("sync engine already started");
            return;
        };

        // Startup drain: backlog left over from a previous session
        if self.connectivity.is_online() {
            match self.store.get_unsynced_count().await {
                Ok(0) => {}
                Ok(count) => {
                    tracing::info!(count, "unsynced backlog found at startup");
                    let _ = self.triggers.send(SyncTrigger::Manual);
                }
                Err(e) => tracing::error!(error = %e, "could not check startup backlog"),
            }
        }

        let engine = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(trigger) = rx.recv().await {
                match trigger {
                    SyncTrigger::ConnectivityRestored => {
                        tokio::time::sleep(engine.debounce).await;
                        if !engine.connectivity.is_online() {
                            continue;
                        }
                        match engine.store.get_unsynced_count().await {
                            Ok(0) => continue,
                            Ok(_) => {}
                            Err(e) => {
                                tracing::error!(error = %e, "could not check backlog");
                                continue;
                            }
                        }
                    }
                    SyncTrigger::Manual => {}
                }

                if let Err(e) = engine.run_once().await {
                    tracing::error!(error = %e, "sync run aborted");
                }

                // Triggers that arrived while this run executed are dropped,
                // not queued: the run already drained the backlog they point at
                while rx.try_recv().is_ok() {}
            }
        });

        *self.task.lock().expect("task lock") = Some(handle);
    }

    /// Stop the engine task
    ///
    /// A run already started is not interrupted at a record boundary by the
    /// caller; stopping only prevents future triggers from being served.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().expect("task lock").take() {
            handle.abort();
        }
    }
}
