//! HTTP handlers for the webhook endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};

use super::dto::WebhookResponse;
use crate::application::WebhookPipeline;
use crate::domain::foundation::Timestamp;
use crate::domain::webhook::RawWebhookRequest;

/// Shared state for webhook handlers.
#[derive(Clone)]
pub struct WebhookAppState {
    pub pipeline: Arc<WebhookPipeline>,
}

impl WebhookAppState {
    pub fn new(pipeline: Arc<WebhookPipeline>) -> Self {
        Self { pipeline }
    }
}

/// POST /webhooks/stripe - Verify a Stripe webhook and forward it to the bus
///
/// The body is taken as raw bytes; the signature covers the exact bytes sent.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = RawWebhookRequest::new(body.to_vec(), headers, Timestamp::now());
    let outcome = state.pipeline.process(request).await;

    (outcome.status, Json(WebhookResponse::from(&outcome)))
}

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}
