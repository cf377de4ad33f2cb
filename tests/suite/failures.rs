//! Failure classification through the full HTTP stack.

use std::time::Duration;

use ideascore_engine::{ProgressPhase, ResultStore, SubmissionCoordinator};
use ideascore_types::{ErrorKind, JobStatus};
use wiremock::MockServer;

use crate::common;

async fn failed_kind(coordinator: &mut SubmissionCoordinator) -> ErrorKind {
    assert_eq!(coordinator.wait().await, JobStatus::Failed);
    coordinator.job().unwrap().error().unwrap().kind
}

#[tokio::test]
async fn unprocessable_idea_is_not_retried() {
    let server = MockServer::start().await;
    common::mount_status(
        &server,
        422,
        serde_json::json!({"code": "DESCRIPTION_TOO_VAGUE", "message": "Say more"}),
        1,
    )
    .await;

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    coordinator.submit(&common::idea()).unwrap();

    assert_eq!(failed_kind(&mut coordinator).await, ErrorKind::Validation);
    let message = &coordinator.job().unwrap().error().unwrap().message;
    assert!(message.contains("Say more"), "{message}");
    assert!(coordinator.store().get_result().is_none());
}

#[tokio::test]
async fn rejected_key_is_an_auth_failure() {
    let server = MockServer::start().await;
    common::mount_status(
        &server,
        401,
        serde_json::json!({"error": {"code": "UNAUTHORIZED", "message": "bad key"}}),
        1,
    )
    .await;

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    coordinator.submit(&common::idea()).unwrap();

    let kind = failed_kind(&mut coordinator).await;
    assert_eq!(kind, ErrorKind::Auth);
    assert!(!kind.is_retryable());
}

#[tokio::test]
async fn persistent_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    common::mount_status(&server, 503, serde_json::json!({"message": "overloaded"}), 3).await;

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    coordinator.submit(&common::idea()).unwrap();

    let kind = failed_kind(&mut coordinator).await;
    assert_eq!(kind, ErrorKind::Server);
    assert!(kind.is_retryable());
    assert_eq!(coordinator.progress().phase, ProgressPhase::Failed);
}

#[tokio::test]
async fn slow_service_hits_the_deadline() {
    let server = MockServer::start().await;
    common::mount_success(&server, Duration::from_secs(3)).await;

    let mut coordinator = SubmissionCoordinator::new(
        common::client_for(&server),
        ResultStore::in_memory(),
        common::settings(Duration::from_millis(300), Duration::from_millis(50)),
    );
    coordinator.submit(&common::idea()).unwrap();

    assert_eq!(failed_kind(&mut coordinator).await, ErrorKind::Timeout);
}

#[tokio::test]
async fn cancel_drops_the_request_silently() {
    let server = MockServer::start().await;
    common::mount_success(&server, Duration::from_secs(3)).await;

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    coordinator.submit(&common::idea()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    coordinator.process_events();

    assert!(coordinator.cancel());
    assert_eq!(coordinator.status(), JobStatus::Cancelled);
    assert!(coordinator.job().unwrap().error().unwrap().kind.is_silent());
    assert_eq!(coordinator.progress().phase, ProgressPhase::Stopped);
    assert!(!coordinator.next_event().await);
    assert!(coordinator.store().get_result().is_none());
}
