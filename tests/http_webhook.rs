//! HTTP integration tests for the webhook endpoint.
//!
//! Sends real requests through the axum router with `oneshot` and checks
//! status codes, response bodies and what reached the bus.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use stripe_event_bridge::adapters::events::InMemoryEventBus;
use stripe_event_bridge::adapters::http::{app_router, WebhookAppState, WebhookResponse};
use stripe_event_bridge::adapters::secrets::InMemorySecretProvider;
use stripe_event_bridge::application::{EventDispatcher, PipelineConfig, WebhookPipeline};
use stripe_event_bridge::domain::foundation::Timestamp;
use stripe_event_bridge::domain::webhook::signature_header_value;

// =============================================================================
// Test Infrastructure
// =============================================================================

const SECRET: &str = "whsec_http_secret";
const MAX_BODY: usize = 64 * 1024;

fn app() -> (Router, Arc<InMemoryEventBus>) {
    let config = PipelineConfig::default();
    let secrets = Arc::new(InMemorySecretProvider::with_secret(
        &config.secret_name,
        &config.secret_version,
        SECRET,
    ));
    let bus = Arc::new(InMemoryEventBus::new());
    let pipeline = WebhookPipeline::new(secrets, EventDispatcher::new(bus.clone()), config);
    let router = app_router(
        WebhookAppState::new(Arc::new(pipeline)),
        MAX_BODY,
        Duration::from_secs(30),
    );
    (router, bus)
}

fn webhook_request(body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn sign(body: &str, timestamp: i64) -> String {
    signature_header_value(SECRET.as_bytes(), timestamp, body.as_bytes())
}

async fn read_json(response: axum::response::Response) -> WebhookResponse {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Webhook Endpoint
// =============================================================================

#[tokio::test]
async fn valid_webhook_returns_ok_and_publishes() {
    let (app, bus) = app();
    let body = r#"{"type":"customer.subscription.created","data":{"object":{"id":"cus_123"}}}"#;
    let signature = sign(body, Timestamp::now().as_unix_secs());

    let response = app.oneshot(webhook_request(body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = read_json(response).await;
    assert_eq!(json.code, "ACCEPTED");
    assert_eq!(bus.event_count(), 1);
    assert_eq!(bus.published_events()[0].subject_id, "cus_123");
}

#[tokio::test]
async fn missing_signature_returns_unauthorized() {
    let (app, bus) = app();
    let body = r#"{"type":"customer.subscription.created","data":{"object":{"id":"cus_123"}}}"#;

    let response = app.oneshot(webhook_request(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = read_json(response).await;
    assert_eq!(json.code, "INVALID_SIGNATURE");
    assert_eq!(json.message, "Signature verification failed");
    assert_eq!(bus.event_count(), 0);
}

#[tokio::test]
async fn expired_signature_returns_unauthorized() {
    let (app, bus) = app();
    let body = r#"{"type":"customer.subscription.created","data":{"object":{"id":"cus_123"}}}"#;
    let signature = sign(body, Timestamp::now().minus_secs(900).as_unix_secs());

    let response = app.oneshot(webhook_request(body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(bus.event_count(), 0);
}

#[tokio::test]
async fn unmapped_event_returns_ok_without_publish() {
    let (app, bus) = app();
    let body = r#"{"type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;
    let signature = sign(body, Timestamp::now().as_unix_secs());

    let response = app.oneshot(webhook_request(body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await.code, "EVENT_IGNORED");
    assert_eq!(bus.event_count(), 0);
}

#[tokio::test]
async fn missing_subject_returns_bad_request() {
    let (app, bus) = app();
    let body = r#"{"type":"customer.subscription.created","data":{"object":{}}}"#;
    let signature = sign(body, Timestamp::now().as_unix_secs());

    let response = app.oneshot(webhook_request(body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(bus.event_count(), 0);
}

#[tokio::test]
async fn error_body_does_not_leak_internal_detail() {
    let (app, _bus) = app();
    let body = "{broken";
    let signature = sign(body, Timestamp::now().as_unix_secs());

    let response = app.oneshot(webhook_request(body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json.message, "Invalid webhook payload");
    assert!(!json.message.contains("line"));
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let (app, bus) = app();
    let body = "x".repeat(MAX_BODY + 1);
    let signature = sign(&body, Timestamp::now().as_unix_secs());

    let response = app.oneshot(webhook_request(&body, Some(signature))).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(bus.event_count(), 0);
}

#[tokio::test]
async fn get_on_webhook_route_is_method_not_allowed() {
    let (app, _bus) = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks/stripe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn health_returns_ok() {
    let (app, _bus) = app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
