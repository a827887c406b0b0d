//! Tracker tests over the HTTP client.
//!
//! These pair [`ExportManager`] with a real [`ExportClient`] pointed at a
//! mock server, so the client's request layer sits between the tracker and
//! the API.
//!
//! # Invariants
//! - A failed status query ends polling after one request, even when the
//!   client has a retry budget
//! - A failed download is reported after one request

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::excel_option;
use coverage_client::{ExportClient, ExportFilters, ExportStatus};
use coverage_export::{DirectorySink, ExportManager, RetrievalError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLL: Duration = Duration::from_millis(200);

fn manager_for(server: &MockServer, dir: &tempfile::TempDir) -> ExportManager {
    let client = ExportClient::builder()
        .base_url(server.uri())
        .max_retries(3)
        .build()
        .unwrap();
    ExportManager::new(
        Arc::new(client),
        Arc::new(DirectorySink::new(dir.path().to_path_buf())),
    )
    .with_poll_interval(POLL)
}

async fn mount_create(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/exports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_transient_status_failure_stops_polling_with_last_snapshot() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_create(&server, json!({"jobId": "exp-1", "status": "pending", "progress": 0})).await;

    Mock::given(method("GET"))
        .and(path("/exports/exp-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "exp-1", "status": "processing", "progress": 40
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exports/exp-1/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exports/exp-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobId": "exp-1", "status": "completed", "progress": 100
        })))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &dir);
    manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();

    let settled = tokio::time::timeout(Duration::from_secs(5), manager.wait_until_settled("exp-1"))
        .await
        .expect("polling should stop after the failed query")
        .unwrap();
    assert_eq!(settled.status, ExportStatus::Processing);
    assert_eq!(settled.progress, 40);

    tokio::time::sleep(POLL * 3).await;
    assert!(!manager.is_polling("exp-1"));
    assert_eq!(manager.job("exp-1").unwrap().progress, 40);
    assert_eq!(requests_to(&server, "/exports/exp-1/status").await, 2);
}

#[tokio::test]
async fn test_transient_download_failure_is_not_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_create(
        &server,
        json!({
            "jobId": "exp-1",
            "status": "completed",
            "progress": 100,
            "filename": "repositories_export_2024-03-01.xlsx"
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/exports/exp-1/download"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/exports/exp-1/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"late".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &dir);
    manager
        .submit(&excel_option(), &ExportFilters::default())
        .await
        .unwrap();

    let err = manager.download("exp-1").await.unwrap_err();

    assert!(matches!(
        err,
        RetrievalError::Transport { ref job_id, ref source }
            if job_id == "exp-1" && source.status() == Some(503)
    ));
    assert_eq!(requests_to(&server, "/exports/exp-1/download").await, 1);
    assert_eq!(manager.job("exp-1").unwrap().status, ExportStatus::Completed);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
