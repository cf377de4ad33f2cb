//! Session persistence of the latest result.

use std::time::Duration;

use ideascore_engine::{RECORD_FILENAME, ResultStore};
use ideascore_types::JobStatus;
use wiremock::MockServer;

use crate::common;

#[tokio::test]
async fn result_survives_reopening_the_session() {
    let server = MockServer::start().await;
    common::mount_success(&server, Duration::ZERO).await;

    let data = tempfile::tempdir().unwrap();
    let session = ResultStore::session_dir(data.path(), "pilot");

    let mut coordinator = common::coordinator(&server, ResultStore::open(&session));
    coordinator.submit(&common::idea()).unwrap();
    assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
    let stored = coordinator.store().get_result().unwrap();
    drop(coordinator);

    let record = session.join(RECORD_FILENAME);
    assert!(record.exists());
    let envelope: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&record).unwrap()).unwrap();
    assert_eq!(envelope["schema"], 1);
    assert_eq!(envelope["version"], 1);

    let reopened = ResultStore::open(&session);
    assert_eq!(reopened.get_result(), Some(stored));

    reopened.clear_result().unwrap();
    assert!(!record.exists());
    assert!(ResultStore::open(&session).get_result().is_none());
}

#[tokio::test]
async fn later_evaluation_replaces_the_stored_one() {
    let server = MockServer::start().await;
    common::mount_success(&server, Duration::ZERO).await;

    let data = tempfile::tempdir().unwrap();
    let session = ResultStore::session_dir(data.path(), "pilot");
    let store = ResultStore::open(&session);
    let reader = store.clone();

    let mut coordinator = common::coordinator(&server, store);
    let first = common::idea();
    coordinator.submit(&first).unwrap();
    coordinator.wait().await;

    let second = common::idea();
    coordinator.submit(&second).unwrap();
    coordinator.wait().await;

    let latest = reader.get_result().unwrap();
    assert_eq!(latest.idea_id(), second.id);
    assert_ne!(latest.idea_id(), first.id);
    assert_eq!(reader.version(), 2);
    assert_eq!(ResultStore::open(&session).get_result(), Some(latest));
}
