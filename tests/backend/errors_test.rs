use axum::{
    body::Bytes,
    http::{header, HeaderValue, StatusCode},
    routing::get,
};
use http_monitoring::config::Service;
use http_monitoring::modules::backend::backend_routes;
use http_monitoring::services::errors::ApiError;
use http_monitoring::BODY_LIMIT_BYTES;
use serde_json::json;

use crate::common::{fresh_state, sample, TestContext};

async fn fail_without_status() -> Result<(), ApiError> {
    Err(ApiError::internal())
}

async fn fail_with_status() -> Result<(), ApiError> {
    Err(ApiError::with_status(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid payload",
    ))
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

fn failing_backend() -> TestContext {
    let state = fresh_state(Service::Backend);
    let routes = backend_routes()
        .route("/fail", get(fail_without_status))
        .route("/fail/declared", get(fail_with_status))
        .route("/explode", get(explode));

    TestContext::serve(http_monitoring::build_backend_app(routes, state.clone()), state)
}

#[tokio::test]
async fn unmatched_route_returns_not_found_without_counting_error() {
    let ctx = TestContext::backend();

    let response = ctx.server.get("/does-not-exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Not Found" }));

    assert_eq!(ctx.requests(), 1);
    assert_eq!(ctx.observations(), 1);
    assert_eq!(ctx.errors(), 0);
}

#[tokio::test]
async fn failure_without_status_is_internal_error_counted_once() {
    let ctx = failing_backend();

    let response = ctx.server.get("/fail").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert_eq!(ctx.errors(), 1);
    assert_eq!(ctx.observations(), 1);
}

#[tokio::test]
async fn declared_status_and_message_are_echoed() {
    let ctx = failing_backend();

    let response = ctx.server.get("/fail/declared").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Invalid payload" }));
    assert_eq!(ctx.errors(), 1);
}

#[tokio::test]
async fn panicking_handler_goes_through_error_path() {
    let ctx = failing_backend();

    let response = ctx.server.get("/explode").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert_eq!(ctx.errors(), 1);

    // The process keeps serving afterwards.
    ctx.server.get("/api/message").await.assert_status_ok();
    assert_eq!(ctx.requests(), 2);
    assert_eq!(ctx.errors(), 1);
}

#[tokio::test]
async fn wrong_method_on_known_path_is_not_found_without_counting_error() {
    let ctx = TestContext::backend();

    for path in ["/api/message", "/metrics"] {
        let response = ctx.server.post(path).await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body, json!({ "error": "Not Found" }));
    }

    assert_eq!(ctx.requests(), 2);
    assert_eq!(ctx.observations(), 2);
    assert_eq!(ctx.errors(), 0);
}

#[tokio::test]
async fn trailing_slash_is_an_unmatched_route() {
    let ctx = TestContext::backend();

    let response = ctx.server.get("/api/message/").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Not Found" }));
    assert_eq!(ctx.errors(), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected_and_counted_once() {
    let ctx = TestContext::backend();
    let payload = vec![b'a'; BODY_LIMIT_BYTES + 1];

    let response = ctx
        .server
        .post("/api/message")
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .add_header(header::CONTENT_LENGTH, HeaderValue::from(payload.len()))
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ctx.requests(), 1);
    assert_eq!(ctx.observations(), 1);
    assert_eq!(ctx.errors(), 1);
}

#[tokio::test]
async fn full_scenario() {
    let ctx = failing_backend();

    assert_eq!(sample(&ctx.export(), "http_requests_total"), Some(0.0));

    ctx.server.get("/api/message").await.assert_status_ok();
    let output = ctx.export();
    assert_eq!(sample(&output, "http_requests_total"), Some(1.0));
    assert_eq!(sample(&output, "http_request_duration_seconds_count"), Some(1.0));

    let errors_before = ctx.errors();
    let response = ctx.server.get("/nowhere").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<serde_json::Value>(), json!({ "error": "Not Found" }));
    assert_eq!(ctx.errors(), errors_before);

    let response = ctx.server.get("/fail").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "error": "Internal Server Error" })
    );
    assert_eq!(ctx.errors(), errors_before + 1);

    let output = ctx.export();
    assert_eq!(sample(&output, "http_requests_total"), Some(3.0));
    assert_eq!(sample(&output, "http_errors_total"), Some(1.0));
    assert_eq!(sample(&output, "http_request_duration_seconds_count"), Some(3.0));
}
