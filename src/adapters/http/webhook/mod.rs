//! HTTP adapter for the Stripe webhook endpoint.
//!
//! - `POST /webhooks/stripe` - Runs the webhook pipeline on the raw request
//! - `GET /health` - Liveness probe

mod dto;
mod handlers;
mod routes;

pub use dto::WebhookResponse;
pub use handlers::{handle_stripe_webhook, health, WebhookAppState};
pub use routes::webhook_router;
