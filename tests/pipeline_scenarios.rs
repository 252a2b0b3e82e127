//! Integration tests for the webhook pipeline.
//!
//! Drives `WebhookPipeline` end to end with in-memory adapters:
//! 1. Signature verification against a provider-supplied secret
//! 2. Parsing and normalization of the Stripe event
//! 3. Dispatch to the bus and the resulting outcome

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stripe_event_bridge::adapters::events::InMemoryEventBus;
use stripe_event_bridge::adapters::secrets::{CachedSecretProvider, InMemorySecretProvider};
use stripe_event_bridge::application::{EventDispatcher, PipelineConfig, WebhookPipeline};
use stripe_event_bridge::domain::foundation::Timestamp;
use stripe_event_bridge::domain::webhook::{
    sign_payload, signature_header_value, DetailType, NormalizedEnvelope, PipelineState,
    RawWebhookRequest,
};
use stripe_event_bridge::ports::{BusError, EventBus, PublishAck};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SECRET: &str = "whsec_integration_secret";

const SCENARIO_A: &str =
    r#"{"type":"customer.subscription.created","data":{"object":{"id":"cus_123"}}}"#;
const SCENARIO_C: &str = r#"{"type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;
const SCENARIO_D: &str =
    r#"{"type":"customer.subscription.created","data":{"object":{"email":"a@example.com"}}}"#;

/// Bus that only counts publishes.
#[derive(Default)]
struct CountingBus {
    publishes: AtomicUsize,
}

#[async_trait]
impl EventBus for CountingBus {
    async fn publish(&self, _envelope: &NormalizedEnvelope) -> Result<PublishAck, BusError> {
        let n = self.publishes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PublishAck::new(format!("count-{n}")))
    }

    fn transport(&self) -> &'static str {
        "counting"
    }
}

struct TestContext {
    secrets: Arc<InMemorySecretProvider>,
    bus: Arc<InMemoryEventBus>,
    pipeline: WebhookPipeline,
}

fn context() -> TestContext {
    let config = PipelineConfig::default();
    let secrets = Arc::new(InMemorySecretProvider::with_secret(
        &config.secret_name,
        &config.secret_version,
        SECRET,
    ));
    let bus = Arc::new(InMemoryEventBus::new());
    let pipeline = WebhookPipeline::new(secrets.clone(), EventDispatcher::new(bus.clone()), config);
    TestContext {
        secrets,
        bus,
        pipeline,
    }
}

fn request_with_header(body: &str, header: &str, received_at: Timestamp) -> RawWebhookRequest {
    let mut headers = HeaderMap::new();
    headers.insert("stripe-signature", HeaderValue::from_str(header).unwrap());
    RawWebhookRequest::new(body, headers, received_at)
}

fn signed(body: &str) -> RawWebhookRequest {
    let now = Timestamp::now();
    let header = signature_header_value(SECRET.as_bytes(), now.as_unix_secs(), body.as_bytes());
    request_with_header(body, &header, now)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn scenario_a_valid_subscription_created_is_published() {
    let ctx = context();

    let outcome = ctx.pipeline.process(signed(SCENARIO_A)).await;

    assert_eq!(outcome.status.as_u16(), 200);
    assert_eq!(ctx.bus.event_count(), 1);
    let envelope = &ctx.bus.published_events()[0];
    assert_eq!(envelope.subject_id, "cus_123");
    assert_eq!(envelope.detail_type, DetailType::CustomerCreated);
    assert_eq!(envelope.vendor_event_type(), Some("customer.subscription.created"));
    assert_eq!(envelope.event_bus_name, "stripeAppEventBus");
}

#[tokio::test]
async fn scenario_b_replayed_signature_is_rejected() {
    let ctx = context();
    let now = Timestamp::now();
    let signed_at = now.minus_secs(900).as_unix_secs();
    let header = signature_header_value(SECRET.as_bytes(), signed_at, SCENARIO_A.as_bytes());

    let outcome = ctx
        .pipeline
        .process(request_with_header(SCENARIO_A, &header, now))
        .await;

    assert_eq!(outcome.status.as_u16(), 401);
    assert_eq!(outcome.state, PipelineState::Rejected);
    assert_eq!(ctx.bus.event_count(), 0);
}

#[tokio::test]
async fn scenario_c_unmapped_event_is_acknowledged_without_publish() {
    let ctx = context();

    let outcome = ctx.pipeline.process(signed(SCENARIO_C)).await;

    assert_eq!(outcome.status.as_u16(), 200);
    assert_eq!(outcome.state, PipelineState::Responded);
    assert_eq!(ctx.bus.event_count(), 0);
}

#[tokio::test]
async fn scenario_d_missing_subject_is_bad_request() {
    let ctx = context();

    let outcome = ctx.pipeline.process(signed(SCENARIO_D)).await;

    assert_eq!(outcome.status.as_u16(), 400);
    assert_eq!(outcome.code, "INVALID_PAYLOAD");
    assert_eq!(ctx.bus.event_count(), 0);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn unmapped_types_never_reach_the_bus() {
    let ctx = context();
    let types = [
        "invoice.paid",
        "customer.subscription.deleted",
        "customer.updated",
        "charge.succeeded",
        "CUSTOMER.CREATED",
    ];

    for event_type in types {
        let body = format!(
            r#"{{"id":"evt_{event_type}","type":"{event_type}","data":{{"object":{{"id":"x_1"}}}}}}"#
        );
        let outcome = ctx.pipeline.process(signed(&body)).await;
        assert_eq!(outcome.status.as_u16(), 200, "type {event_type}");
    }

    assert_eq!(ctx.bus.event_count(), 0);
}

#[tokio::test]
async fn each_mapped_event_publishes_exactly_one_envelope() {
    let config = PipelineConfig::default();
    let secrets = Arc::new(InMemorySecretProvider::with_secret(
        &config.secret_name,
        &config.secret_version,
        SECRET,
    ));
    let bus = Arc::new(CountingBus::default());
    let pipeline = WebhookPipeline::new(secrets, EventDispatcher::new(bus.clone()), config);

    for event_type in ["customer.subscription.created", "customer.created"] {
        let body = format!(r#"{{"type":"{event_type}","data":{{"object":{{"id":"cus_1"}}}}}}"#);
        let outcome = pipeline.process(signed(&body)).await;
        assert_eq!(outcome.status.as_u16(), 200);
        assert_eq!(
            outcome.receipt.map(|r| r.detail_type),
            Some(DetailType::CustomerCreated)
        );
    }

    assert_eq!(bus.publishes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let ctx = context();
    let now = Timestamp::now();
    let header = signature_header_value(SECRET.as_bytes(), now.as_unix_secs(), SCENARIO_A.as_bytes());
    let tampered = SCENARIO_A.replace("cus_123", "cus_999");

    let outcome = ctx
        .pipeline
        .process(request_with_header(&tampered, &header, now))
        .await;

    assert_eq!(outcome.status.as_u16(), 401);
    assert_eq!(ctx.bus.event_count(), 0);
}

#[tokio::test]
async fn any_matching_v1_signature_is_accepted() {
    let ctx = context();
    let now = Timestamp::now();
    let ts = now.as_unix_secs();
    let stale = sign_payload(b"whsec_old_secret", ts, SCENARIO_A.as_bytes());
    let current = sign_payload(SECRET.as_bytes(), ts, SCENARIO_A.as_bytes());
    let header = format!("t={ts},v1={stale},v1={current},v0=deadbeef");

    let outcome = ctx
        .pipeline
        .process(request_with_header(SCENARIO_A, &header, now))
        .await;

    assert_eq!(outcome.status.as_u16(), 200);
}

#[tokio::test]
async fn malformed_json_is_bad_request_not_a_crash() {
    let ctx = context();

    let outcome = ctx.pipeline.process(signed("{not json")).await;

    assert_eq!(outcome.status.as_u16(), 400);
}

// =============================================================================
// Dependency Failures
// =============================================================================

#[tokio::test]
async fn bus_failure_asks_for_redelivery() {
    let ctx = context();
    ctx.bus.fail_with(BusError::Transport("connection reset".into()));

    let outcome = ctx.pipeline.process(signed(SCENARIO_A)).await;

    assert!(outcome.status.is_server_error());
    assert!(!outcome.is_acknowledged());
}

#[tokio::test]
async fn redelivery_after_bus_recovers_is_published() {
    let ctx = context();
    ctx.bus.fail_with(BusError::Transport("connection reset".into()));
    assert!(ctx.pipeline.process(signed(SCENARIO_A)).await.status.is_server_error());

    ctx.bus.clear_failure();
    let outcome = ctx.pipeline.process(signed(SCENARIO_A)).await;

    assert_eq!(outcome.status.as_u16(), 200);
    assert_eq!(ctx.bus.event_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_bus_exceeds_invocation_timeout() {
    let ctx = context();
    ctx.bus.set_latency(Duration::from_secs(60));

    let outcome = ctx.pipeline.process(signed(SCENARIO_A)).await;

    assert_eq!(outcome.status.as_u16(), 504);
}

// =============================================================================
// Secret Rotation
// =============================================================================

#[tokio::test]
async fn rotated_secret_is_picked_up_through_cache() {
    let config = PipelineConfig::default();
    let store = Arc::new(InMemorySecretProvider::with_secret(
        &config.secret_name,
        &config.secret_version,
        SECRET,
    ));
    let cached = Arc::new(CachedSecretProvider::new(store.clone(), Duration::from_secs(300)));
    let bus = Arc::new(InMemoryEventBus::new());
    let pipeline = WebhookPipeline::new(
        cached,
        EventDispatcher::new(bus.clone()),
        config.clone(),
    );

    // Warm the cache with the old secret
    assert_eq!(pipeline.process(signed(SCENARIO_A)).await.status.as_u16(), 200);

    store.rotate(&config.secret_name, &config.secret_version, "whsec_rotated");
    let now = Timestamp::now();
    let header = signature_header_value(b"whsec_rotated", now.as_unix_secs(), SCENARIO_A.as_bytes());
    let outcome = pipeline
        .process(request_with_header(SCENARIO_A, &header, now))
        .await;

    assert_eq!(outcome.status.as_u16(), 200);
    assert_eq!(bus.event_count(), 2);
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn forged_signature_refetches_secret_once() {
    let ctx = context();
    let now = Timestamp::now();
    let header = signature_header_value(b"whsec_attacker", now.as_unix_secs(), SCENARIO_A.as_bytes());

    let outcome = ctx
        .pipeline
        .process(request_with_header(SCENARIO_A, &header, now))
        .await;

    assert_eq!(outcome.status.as_u16(), 401);
    assert_eq!(ctx.secrets.fetch_count(), 2);
}
