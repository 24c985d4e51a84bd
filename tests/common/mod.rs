//! Shared fixtures for integration tests
//!
//! Provides a tempfile-backed engine and an in-memory mock of the remote
//! store with programmable failures and concurrency accounting.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fieldsync::config::Config;
use fieldsync::error::SyncError;
use fieldsync::model::ReadingDraft;
use fieldsync::remote::{DocumentUpload, ReadingUpload, RemoteStore};
use fieldsync::store::LocalStore;
use fieldsync::sync::SyncEngine;

/// Route engine logs through the test harness; honors `RUST_LOG`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory remote store double
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    inner: Arc<MockRemoteInner>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    readings: Mutex<Vec<ReadingUpload>>,
    documents: Mutex<Vec<DocumentUpload>>,
    document_attempts: AtomicUsize,
    fail_readings: AtomicBool,
    fail_documents: AtomicBool,
    delay_ms: AtomicUsize,
    concurrent: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every reading write fail until cleared
    pub fn fail_readings(&self, fail: bool) {
        self.inner.fail_readings.store(fail, Ordering::SeqCst);
    }

    /// Make every document write fail until cleared
    pub fn fail_documents(&self, fail: bool) {
        self.inner.fail_documents.store(fail, Ordering::SeqCst);
    }

    /// Hold each reading write open for `ms` to expose overlapping runs
    pub fn set_delay_ms(&self, ms: usize) {
        self.inner.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn readings(&self) -> Vec<ReadingUpload> {
        self.inner.readings.lock().unwrap().clone()
    }

    pub fn documents(&self) -> Vec<DocumentUpload> {
        self.inner.documents.lock().unwrap().clone()
    }

    /// Document writes attempted, including failed ones
    pub fn document_attempts(&self) -> usize {
        self.inner.document_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of reading writes ever in flight at once
    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent.load(Ordering::SeqCst)
    }
}

impl RemoteStore for MockRemote {
    async fn submit_reading(&self, reading: &ReadingUpload) -> Result<(), SyncError> {
        let current = self.inner.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_concurrent.fetch_max(current, Ordering::SeqCst);

        let delay = self.inner.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        let result = if self.inner.fail_readings.load(Ordering::SeqCst) {
            Err(SyncError::remote_write("injected failure"))
        } else {
            self.inner.readings.lock().unwrap().push(reading.clone());
            Ok(())
        };

        self.inner.concurrent.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn submit_document(&self, document: &DocumentUpload) -> Result<(), SyncError> {
        self.inner.document_attempts.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_documents.load(Ordering::SeqCst) {
            return Err(SyncError::secondary_write("injected failure"));
        }
        self.inner.documents.lock().unwrap().push(document.clone());
        Ok(())
    }
}

/// A fresh engine over a temp database, offline by default
pub async fn test_engine(dir: &tempfile::TempDir) -> (SyncEngine<MockRemote>, MockRemote) {
    test_engine_at(dir, "test.db", false).await
}

/// An engine over a named database file, with explicit initial connectivity
///
/// Reopening the same file name simulates an app restart.
pub async fn test_engine_at(
    dir: &tempfile::TempDir,
    db_name: &str,
    initially_online: bool,
) -> (SyncEngine<MockRemote>, MockRemote) {
    init_tracing();
    let path = dir.path().join(db_name);
    let store = LocalStore::open(&path).await.expect("open local store");
    let config = Config::builder()
        .db_path(&path)
        .sync_debounce(Duration::from_millis(10))
        .build()
        .expect("test config");
    let remote = MockRemote::new();
    let engine = SyncEngine::new(store, remote.clone(), &config, initially_online);
    (engine, remote)
}

/// Standard capture draft used across scenarios
pub fn temp_draft() -> ReadingDraft {
    ReadingDraft {
        equipment_id: "eq-1".to_string(),
        reading_type: "temp".to_string(),
        value: 72.0,
        unit: "F".to_string(),
        notes: None,
        location_notes: None,
    }
}

/// Poll until the condition holds or the timeout elapses
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {:?}", timeout);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
