//! Shared test utilities and fixtures
//!
//! A wiremock scoring service plus helpers for wiring a coordinator to it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ideascore_engine::{CoordinatorSettings, ResultStore, SubmissionCoordinator};
use ideascore_providers::{HttpScoringClient, RetryConfig, ScoringClientConfig};
use ideascore_types::{BusinessIdea, DEFAULT_STAGES};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANALYZE_PATH: &str = "/api/evaluate/analyze";
pub const IDEA_TEXT: &str = "Solar-powered kiosk for rural vendors";

/// A successful scoring response: score 78, confidence 0.92.
pub fn success_body() -> serde_json::Value {
    serde_json::json!({
        "id": "res-78",
        "overall_score": 78,
        "confidence": 0.92,
        "structured_data": {
            "Main_Product_Service": "Solar charging kiosk",
            "Key_USP": "  Works off-grid  ",
            "Entrepreneur_Name": null
        },
        "dimensions": {
            "marketViability": {"score": 81, "confidence": 0.9},
            "financialFeasibility": {"score": 70, "confidence": 0.8}
        },
        "feedback": {
            "strengths": ["Clear niche", ""],
            "next_steps": ["Pilot in two villages"]
        },
        "completed_at": "2026-10-14T09:30:00Z"
    })
}

pub async fn mount_success(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: u16, body: serde_json::Value, expect: u64) {
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

pub fn client_for(server: &MockServer) -> Arc<HttpScoringClient> {
    let mut config = ScoringClientConfig::new(Url::parse(&server.uri()).unwrap());
    config.api_key = Some("test-key".to_string());
    config.request_timeout = Duration::from_secs(5);
    config.retry = RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        jitter_factor: 0.0,
    };
    Arc::new(HttpScoringClient::new(config).unwrap())
}

pub fn settings(timeout: Duration, cadence: Duration) -> CoordinatorSettings {
    CoordinatorSettings {
        timeout,
        cadence,
        stages: DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect(),
    }
}

pub fn coordinator(server: &MockServer, store: ResultStore) -> SubmissionCoordinator {
    SubmissionCoordinator::new(
        client_for(server),
        store,
        settings(Duration::from_secs(10), Duration::from_millis(50)),
    )
}

pub fn idea() -> BusinessIdea {
    BusinessIdea::new("Solar kiosk", IDEA_TEXT, "Energy")
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
