//! Axum router configuration for the webhook endpoint.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers::{handle_stripe_webhook, health, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /webhooks/stripe` - Handle Stripe webhooks (no auth, signature verified)
/// - `GET /health` - Liveness probe
///
/// Bodies larger than `max_body_bytes` are refused with 413 before the
/// pipeline runs.
pub fn webhook_router(state: WebhookAppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/webhooks/stripe", post(handle_stripe_webhook))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
