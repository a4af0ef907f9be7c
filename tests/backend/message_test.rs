use axum::http::{header, HeaderValue, StatusCode};
use serde_json::json;

use crate::common::{sample, TestContext};

#[tokio::test]
async fn get_message_returns_static_payload() {
    let ctx = TestContext::backend();

    let response = ctx.server.get("/api/message").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "message": "Hello from backend!" }));
}

#[tokio::test]
async fn fresh_registry_reports_zero_requests() {
    let ctx = TestContext::backend();

    let output = ctx.export();
    assert_eq!(sample(&output, "http_requests_total"), Some(0.0));
    assert_eq!(sample(&output, "http_errors_total"), Some(0.0));
    assert_eq!(sample(&output, "http_request_duration_seconds_count"), Some(0.0));
}

#[tokio::test]
async fn one_request_is_counted_and_timed_once() {
    let ctx = TestContext::backend();

    ctx.server.get("/api/message").await.assert_status_ok();

    let output = ctx.export();
    assert_eq!(sample(&output, "http_requests_total"), Some(1.0));
    assert_eq!(sample(&output, "http_request_duration_seconds_count"), Some(1.0));
    assert_eq!(sample(&output, "http_errors_total"), Some(0.0));
}

#[tokio::test]
async fn n_requests_increase_counter_by_exactly_n() {
    let ctx = TestContext::backend();

    for _ in 0..25 {
        ctx.server.get("/api/message").await.assert_status_ok();
    }

    assert_eq!(ctx.requests(), 25);
    assert_eq!(ctx.observations(), 25);
    assert_eq!(ctx.errors(), 0);
}

#[tokio::test]
async fn cors_is_permissive() {
    let ctx = TestContext::backend();

    let response = ctx
        .server
        .get("/api/message")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
}
