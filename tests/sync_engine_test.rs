//! End-to-end scenarios for the capture-and-sync engine
//!
//! Exercises capture, connectivity-driven draining, retry accounting across
//! restarts, the note-document cascade, and the single-run guard, against a
//! tempfile-backed store and an in-memory mock remote.

mod common;

use std::time::Duration;

use fieldsync::model::ReadingDraft;
use fieldsync::sync::SyncNotification;
use pretty_assertions::assert_eq;

use common::{temp_draft, test_engine, test_engine_at, wait_until};

#[tokio::test]
async fn offline_capture_then_online_sync() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;
    engine.start().await;

    // Captured offline: durable locally, nothing sent
    engine.capture_reading(temp_draft()).await.unwrap();
    assert_eq!(engine.status().await.unsynced_count, 1);
    assert!(remote.readings().is_empty());

    // Going online drains the backlog after the debounce
    engine.set_online(true).await;
    wait_until(Duration::from_secs(5), || async {
        engine.status().await.unsynced_count == 0
    })
    .await;

    let sent = remote.readings();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].equipment_id, "eq-1");
    assert_eq!(sent[0].sensor_type, "temp");
    assert_eq!(sent[0].value, 72.0);
    assert_eq!(sent[0].unit, "F");
    assert_eq!(sent[0].source, "manual");

    engine.stop();
}

#[tokio::test]
async fn failed_sync_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let (engine, remote) = test_engine_at(&dir, "app.db", true).await;
        let id = engine.capture_reading(temp_draft()).await.unwrap();

        remote.fail_readings(true);
        let result = engine.run_once().await.unwrap().unwrap();
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 1);
        id
        // Engine dropped here: the app is closed
    };

    // On reopen the reading is still pending with its retry recorded
    let (engine, _remote) = test_engine_at(&dir, "app.db", false).await;
    assert_eq!(engine.store().get_unsynced_count().await.unwrap(), 1);
    let reading = engine.store().get_reading(id).await.unwrap();
    assert_eq!(reading.retry_count, 1);
    assert!(!reading.synced);
}

#[tokio::test]
async fn retry_count_tracks_failed_runs() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    let id = engine.capture_reading(temp_draft()).await.unwrap();
    remote.fail_readings(true);

    for run in 1..=3 {
        let result = engine.run_once().await.unwrap().unwrap();
        assert_eq!(result.failure_count, 1);
        let reading = engine.store().get_reading(id).await.unwrap();
        assert_eq!(reading.retry_count, run);
        assert!(!reading.synced);
    }

    // Recovery freezes the retry count at its value at success time
    remote.fail_readings(false);
    let result = engine.run_once().await.unwrap().unwrap();
    assert_eq!(result.success_count, 1);
    let reading = engine.store().get_reading(id).await.unwrap();
    assert!(reading.synced);
    assert_eq!(reading.retry_count, 3);
}

#[tokio::test]
async fn synced_readings_are_never_resubmitted() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    engine.capture_reading(temp_draft()).await.unwrap();
    engine.run_once().await.unwrap().unwrap();
    assert_eq!(remote.readings().len(), 1);

    // Subsequent runs see an empty backlog
    let result = engine.run_once().await.unwrap().unwrap();
    assert_eq!(result.success_count, 0);
    assert_eq!(result.failure_count, 0);
    assert_eq!(remote.readings().len(), 1);
}

#[tokio::test]
async fn notes_cascade_into_one_document() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    engine
        .capture_reading(ReadingDraft {
            notes: Some("bearing noise".to_string()),
            ..temp_draft()
        })
        .await
        .unwrap();
    engine.run_once().await.unwrap().unwrap();

    let documents = remote.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].equipment_id, "eq-1");
    assert_eq!(documents[0].content, "bearing noise");
    assert_eq!(documents[0].category, "field-notes");
    assert!(documents[0].file_name.starts_with("temp-reading-"));
}

#[tokio::test]
async fn cascade_failure_does_not_affect_sync_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    engine
        .capture_reading(ReadingDraft {
            notes: Some("bearing noise".to_string()),
            ..temp_draft()
        })
        .await
        .unwrap();
    remote.fail_documents(true);

    let result = engine.run_once().await.unwrap().unwrap();

    // Exactly one document attempt; the primary outcome is untouched
    assert_eq!(remote.document_attempts(), 1);
    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 0);
    assert_eq!(engine.status().await.unsynced_count, 0);

    // The document is not retried on the next run either
    engine.run_once().await.unwrap().unwrap();
    assert_eq!(remote.document_attempts(), 1);
}

#[tokio::test]
async fn reading_without_notes_produces_no_document() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    engine.capture_reading(temp_draft()).await.unwrap();
    engine.run_once().await.unwrap().unwrap();

    assert_eq!(remote.document_attempts(), 0);
}

#[tokio::test]
async fn mixed_batch_partial_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    // MockRemote fails everything or nothing, so build the mixed outcome
    // across two runs: first all three fail, then all succeed.
    for _ in 0..3 {
        engine.capture_reading(temp_draft()).await.unwrap();
    }

    remote.fail_readings(true);
    let result = engine.run_once().await.unwrap().unwrap();
    assert_eq!(result.failure_count, 3);
    assert_eq!(engine.status().await.unsynced_count, 3);

    remote.fail_readings(false);
    let result = engine.run_once().await.unwrap().unwrap();
    assert_eq!(result.success_count, 3);
    assert_eq!(engine.status().await.unsynced_count, 0);

    // Nothing was lost along the way
    assert_eq!(engine.store().get_reading_count().await.unwrap(), 3);
    assert_eq!(remote.readings().len(), 3);
}

#[tokio::test]
async fn overlapping_triggers_run_at_most_once() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;

    for _ in 0..4 {
        engine.capture_reading(temp_draft()).await.unwrap();
    }
    remote.set_delay_ms(30);

    let first = engine.clone();
    let second = engine.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.run_once().await.unwrap() }),
        tokio::spawn(async move { second.run_once().await.unwrap() }),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    // Exactly one of the two concurrent triggers ran; the other was dropped
    assert!(a.is_some() != b.is_some());
    assert_eq!(remote.max_concurrent(), 1);
    assert_eq!(remote.readings().len(), 4);
    assert_eq!(engine.status().await.unsynced_count, 0);
}

#[tokio::test]
async fn trigger_during_run_is_dropped_not_queued() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine_at(&dir, "app.db", true).await;
    engine.start().await;

    let id = engine.capture_reading(temp_draft()).await.unwrap();
    remote.fail_readings(true);
    remote.set_delay_ms(150);

    engine.sync_now();
    tokio::time::sleep(Duration::from_millis(50)).await;
    // Mid-run request: must be a no-op, not a queued second run
    engine.sync_now();

    wait_until(Duration::from_secs(5), || async {
        engine.store().get_reading(id).await.unwrap().retry_count >= 1
    })
    .await;
    // Long enough for a queued second drain to have completed
    tokio::time::sleep(Duration::from_millis(400)).await;

    let reading = engine.store().get_reading(id).await.unwrap();
    assert_eq!(reading.retry_count, 1);
    assert!(!reading.synced);

    engine.stop();
}

#[tokio::test]
async fn startup_drain_clears_leftover_backlog() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (engine, _remote) = test_engine_at(&dir, "app.db", false).await;
        engine.capture_reading(temp_draft()).await.unwrap();
        // App closes before ever going online
    }

    // Next session starts online with a backlog: drained without any trigger
    let (engine, remote) = test_engine_at(&dir, "app.db", true).await;
    engine.start().await;

    wait_until(Duration::from_secs(5), || async {
        engine.status().await.unsynced_count == 0
    })
    .await;
    assert_eq!(remote.readings().len(), 1);

    engine.stop();
}

#[tokio::test]
async fn notifications_follow_run_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine(&dir).await;
    let mut notifications = engine.subscribe();

    engine.capture_reading(temp_draft()).await.unwrap();
    remote.fail_readings(true);
    engine.run_once().await.unwrap().unwrap();

    assert_eq!(
        notifications.recv().await.unwrap(),
        SyncNotification::Failed { failure_count: 1 }
    );

    remote.fail_readings(false);
    engine.run_once().await.unwrap().unwrap();

    assert_eq!(
        notifications.recv().await.unwrap(),
        SyncNotification::Synced {
            success_count: 1,
            failure_count: 0
        }
    );
}

#[tokio::test]
async fn offline_transition_does_not_trigger_sync() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, remote) = test_engine_at(&dir, "app.db", true).await;
    engine.start().await;

    // Going offline must not start a run; captures accumulate locally
    engine.set_online(false).await;
    engine.capture_reading(temp_draft()).await.unwrap();
    engine.capture_reading(temp_draft()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(remote.readings().is_empty());
    assert_eq!(engine.status().await.unsynced_count, 2);

    // The accumulated backlog drains once connectivity returns
    engine.set_online(true).await;
    wait_until(Duration::from_secs(5), || async {
        engine.status().await.unsynced_count == 0
    })
    .await;
    assert_eq!(remote.readings().len(), 2);

    engine.stop();
}
