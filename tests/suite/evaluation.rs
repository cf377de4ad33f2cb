//! End-to-end evaluation: upload, submit, progress, store, present.

use std::time::Duration;

use ideascore_engine::{
    BusinessIdea, CaptureAdapter, CaptureLimits, CaptureSource, ProgressPhase, ResultStore,
    StageStatus,
};
use ideascore_types::{CaptureModality, ConfidenceLabel, DEFAULT_STAGES, JobStatus, present};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, ANALYZE_PATH, IDEA_TEXT};

#[tokio::test]
async fn text_upload_is_scored_and_presented() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(header("x-retry-count", "0"))
        .and(body_partial_json(serde_json::json!({
            "title": "Solar kiosk",
            "description": IDEA_TEXT,
            "industry": "Energy",
            "language": "en-IN"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::success_body())
                .set_delay(Duration::from_millis(600)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::write_file(dir.path(), "idea.txt", format!("{IDEA_TEXT}\n").as_bytes());

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    let adapter = CaptureAdapter::new(CaptureLimits::default());

    let capture = coordinator
        .capture(&adapter, CaptureSource::Upload(file))
        .await
        .unwrap();
    assert_eq!(capture.modality, CaptureModality::Document);
    assert_eq!(capture.text, IDEA_TEXT);

    let idea = BusinessIdea::from_capture(&capture, "Solar kiosk", "energy");
    assert_eq!(idea.description, IDEA_TEXT);
    coordinator.submit(&idea).unwrap();

    // Poll well inside the cadence and record each stage as it becomes active.
    let mut seen: Vec<String> = Vec::new();
    while !coordinator.status().is_terminal() {
        coordinator.process_events();
        let snapshot = coordinator.progress();
        if let Some(label) = snapshot.active_label()
            && seen.last().map(String::as_str) != Some(label)
        {
            assert!(snapshot.percent < 100);
            seen.push(label.to_string());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(coordinator.status(), JobStatus::Succeeded);

    let order: Vec<usize> = seen
        .iter()
        .map(|label| DEFAULT_STAGES.iter().position(|s| s == label).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "stages out of order: {seen:?}");
    assert_eq!(order.first(), Some(&0));
    assert_eq!(seen.last().map(String::as_str), Some("Generating Report"));

    let snapshot = coordinator.progress();
    assert_eq!(snapshot.phase, ProgressPhase::Completed);
    assert!(snapshot.stages.iter().all(|s| s.status == StageStatus::Completed));

    let stored = coordinator.store().get_result().unwrap();
    assert_eq!(stored.idea_id(), idea.id);
    let display = present(&stored);
    assert_eq!(display.score_text, "78/100");
    assert_eq!(display.confidence_percent, 92);
    assert_eq!(display.confidence_label, ConfidenceLabel::High);
    assert_eq!(display.confidence_label.as_str(), "High Confidence");

    let details: Vec<(&str, &str)> = display
        .key_details
        .iter()
        .map(|row| (row.label, row.value.as_str()))
        .collect();
    assert_eq!(
        details,
        vec![
            ("Key Selling Point", "Works off-grid"),
            ("Product/Service", "Solar charging kiosk"),
        ]
    );
    assert!(display.dimensions.iter().any(|d| d.name == "Market Viability"));
    assert_eq!(display.feedback.strengths, vec!["Clear niche".to_string()]);
}

#[tokio::test]
async fn image_upload_without_recognizer_never_reaches_the_service() {
    let server = MockServer::start().await;
    common::mount_success(&server, Duration::from_secs(5)).await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::write_file(dir.path(), "sketch.png", b"\x89PNG\r\n\x1a\n");

    let mut coordinator = common::coordinator(&server, ResultStore::in_memory());
    let adapter = CaptureAdapter::new(CaptureLimits::default());

    let err = coordinator
        .capture(&adapter, CaptureSource::Upload(file))
        .await
        .unwrap_err();
    assert!(err.kind().is_retryable());
    assert_eq!(coordinator.status(), JobStatus::Failed);
    assert!(server.received_requests().await.unwrap().is_empty());

    // Switching to typed text recovers without any leftover state.
    coordinator.submit(&common::idea()).unwrap();
    assert_eq!(coordinator.status(), JobStatus::Submitting);
    coordinator.cancel();
}
