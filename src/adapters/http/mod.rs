//! HTTP adapters - REST API implementations.

pub mod webhook;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use webhook::{webhook_router, WebhookAppState, WebhookResponse};

/// Builds the full application router with request ids, tracing and an
/// outer request timeout.
pub fn app_router(state: WebhookAppState, max_body_bytes: usize, request_timeout: Duration) -> Router {
    webhook_router(state, max_body_bytes).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
