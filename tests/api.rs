//! HTTP API Tests
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`. Tests that wait on the
//! worker run on a paused clock.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use batch_ingest::config::SchedulerConfig;
use batch_ingest::server::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn test_app() -> AppState {
    AppState::new(SchedulerConfig {
        stats_interval_secs: 0,
        ..SchedulerConfig::default()
    })
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_ingest(router: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn get_status(router: &Router, ingestion_id: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(format!("/status/{}", ingestion_id))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn submit(router: &Router, ids: Value, priority: &str) -> String {
    let (status, body) = post_ingest(router, json!({"ids": ids, "priority": priority})).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    body["ingestion_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_reports_liveness() {
    let app = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&app.router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ingestion API is live!");
}

#[tokio::test]
async fn test_ingest_then_status() {
    let app = test_app();
    let router = app.router();

    let id = submit(&router, json!([1, 2, 3, 4, 5]), "MEDIUM").await;
    let (status, body) = get_status(&router, &id).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingestion_id"], id.as_str());
    assert_eq!(body["status"], "yet_to_start");
    assert_eq!(body["batches"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_status_reads_are_idempotent() {
    let app = test_app();
    let router = app.router();
    let id = submit(&router, json!([1, 2, 3, 4]), "LOW").await;

    let first = get_status(&router, &id).await;
    let second = get_status(&router, &id).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = test_app();

    let (status, body) = get_status(&app.router(), "nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Ingestion ID not found");
}

#[tokio::test]
async fn test_invalid_priority_is_rejected_without_side_effects() {
    let app = test_app();

    let (status, body) = post_ingest(
        &app.router(),
        json!({"ids": [1, 2, 3], "priority": "INVALID"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("INVALID"));
    assert!(app.store.is_empty());
    assert!(app.queue.is_empty());
}

#[tokio::test]
async fn test_malformed_bodies_are_rejected() {
    let app = test_app();
    let router = app.router();

    let cases = [
        json!({"ids": [1, 2, 1_000_000_008u64], "priority": "MEDIUM"}),
        json!({"ids": [], "priority": "HIGH"}),
        json!({"ids": [0], "priority": "HIGH"}),
        json!({"ids": [-1], "priority": "HIGH"}),
        json!({"ids": "1,2,3", "priority": "HIGH"}),
        json!({"priority": "HIGH"}),
    ];

    for case in cases {
        let (status, body) = post_ingest(&router, case.clone()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "case {}", case);
        assert!(body["error"].is_string());
    }

    assert!(app.store.is_empty());
    assert!(app.queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_seven_ids_end_to_end() {
    let app = test_app();
    let router = app.router();
    let shutdown = CancellationToken::new();
    app.start_simulated_worker(shutdown.clone());

    let id = submit(&router, json!([1, 2, 3, 4, 5, 6, 7]), "MEDIUM").await;

    let (_, body) = get_status(&router, &id).await;
    let sizes: Vec<usize> = body["batches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["ids"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(body["status"], "yet_to_start");

    // First batch in flight after the window.
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let (_, body) = get_status(&router, &id).await;
    assert_eq!(body["status"], "triggered");
    assert_eq!(body["batches"][0]["status"], "triggered");
    assert_eq!(body["batches"][1]["status"], "yet_to_start");

    // Window + three sequential processing steps.
    tokio::time::sleep(Duration::from_secs(3)).await;
    let (_, body) = get_status(&router, &id).await;
    assert_eq!(body["status"], "completed");
    for batch in body["batches"].as_array().unwrap() {
        assert_eq!(batch["status"], "completed");
    }

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_high_priority_overtakes_low() {
    let app = test_app();
    let router = app.router();
    let shutdown = CancellationToken::new();
    app.start_simulated_worker(shutdown.clone());

    let low = submit(&router, json!([1, 2, 3]), "LOW").await;
    let high = submit(&router, json!([4, 5, 6]), "HIGH").await;

    tokio::time::sleep(Duration::from_millis(6_500)).await;
    let (_, low_body) = get_status(&router, &low).await;
    let (_, high_body) = get_status(&router, &high).await;
    assert_eq!(high_body["status"], "completed");
    assert_eq!(low_body["status"], "triggered");

    tokio::time::sleep(Duration::from_secs(1)).await;
    let (_, low_body) = get_status(&router, &low).await;
    assert_eq!(low_body["status"], "completed");

    shutdown.cancel();
}
