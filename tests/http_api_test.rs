//! Integration tests for the HTTP interface
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`,
//! so JSON extraction, status codes and headers are exercised as a client
//! would see them.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use helpdesk_export::adapters::store::{MemoryStore, Stores};
use helpdesk_export::config::secret_string;
use helpdesk_export::core::export::{ArtifactStore, BatchOrchestrator};
use helpdesk_export::domain::{Customer, CustomerId};
use helpdesk_export::security::TokenAuthority;
use helpdesk_export::server::{router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir, customers: u64) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let base = Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap();
    for id in 1..=customers {
        store
            .insert_customer(
                Customer::builder()
                    .id(CustomerId::new(id).unwrap())
                    .name(format!("Customer {id}"))
                    .date_created(base + Duration::minutes(id as i64))
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }

    let orchestrator = BatchOrchestrator::new(
        Stores::from_backend(store.clone()),
        ArtifactStore::new(dir.path()),
        TokenAuthority::new(
            secret_string("http-test-secret-0123456789abcdef".to_string()),
            3600,
            600,
        ),
        "%Y-%m-%d",
        "http://localhost:8080",
    );
    let state = Arc::new(AppState::new(orchestrator, "memory"));
    (router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn token(app: &Router, action: &str) -> String {
    let (status, body) = post_json(app, "/batch/token", json!({ "action": action })).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 0);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_full_export_over_http() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 45);
    let token = token(&app, "batch-export").await;

    // Step given as a string, the way form-encoding clients send it
    let (status, body) = post_json(
        &app,
        "/batch/step",
        json!({ "step": "1", "job_type": "customers-export", "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "step": 2, "percentage": 66 }));

    let (_, body) = post_json(
        &app,
        "/batch/step",
        json!({ "step": 2, "job_type": "customers-export", "token": token }),
    )
    .await;
    assert_eq!(body["step"], "done");
    assert_eq!(body["percentage"], 100);
    let url = body["url"].as_str().unwrap();
    let path = url.strip_prefix("http://localhost:8080").unwrap();

    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"customers-export-"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut reader = csv::Reader::from_reader(bytes.as_ref());
    assert_eq!(reader.records().count(), 45);

    // Second download of the same link is gone
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_bad_token_is_an_error_response() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 5);

    let (status, body) = post_json(
        &app,
        "/batch/step",
        json!({ "step": 1, "job_type": "customers-export", "token": "forged" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
    assert_eq!(
        body["message"],
        "You do not have permission to perform this action"
    );
}

#[tokio::test]
async fn test_unknown_job_type_is_an_error_response() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 5);
    let token = token(&app, "batch-export").await;

    let (_, body) = post_json(
        &app,
        "/batch/step",
        json!({ "step": 1, "job_type": "Arbitrary_Class", "token": token }),
    )
    .await;
    assert_eq!(body["error"], true);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Unknown batch job type"));
}

#[tokio::test]
async fn test_malformed_step_request() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 5);

    let (status, body) = post_json(&app, "/batch/step", json!({ "step": "two" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid batch request"));
}

#[tokio::test]
async fn test_empty_export_over_http() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 0);
    let token = token(&app, "batch-export").await;

    let (_, body) = post_json(
        &app,
        "/batch/step",
        json!({ "step": 1, "job_type": "customers-export", "token": token }),
    )
    .await;
    assert_eq!(
        body,
        json!({ "error": true, "message": "No data found for export parameters" })
    );
}

#[tokio::test]
async fn test_settings_import_over_http() {
    let dir = TempDir::new().unwrap();
    let (app, store) = app(&dir, 0);
    let token = token(&app, "batch-import").await;

    let (_, body) = post_json(
        &app,
        "/batch/step",
        json!({
            "step": 1,
            "job_type": "settings-import",
            "token": token,
            "settings": { "portal_page": 12, "notify_agents": true }
        }),
    )
    .await;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Settings successfully imported." })
    );

    let settings = store.settings().unwrap();
    assert_eq!(settings["portal_page"], 12);
    assert_eq!(settings["notify_agents"], true);
}

#[tokio::test]
async fn test_unknown_token_action_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 0);

    let (status, body) = post_json(&app, "/batch/token", json!({ "action": "delete-all" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_forged_download_handle_is_forbidden() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir, 0);

    let request = Request::builder()
        .uri("/batch/download/not-a-real-handle")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
