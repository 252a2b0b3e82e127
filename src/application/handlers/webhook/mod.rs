//! Webhook handlers.
//!
//! - `EventDispatcher` - Publishes normalized envelopes to the bus
//! - `WebhookPipeline` - Runs verify → parse → normalize → dispatch for one request

mod dispatcher;
mod pipeline;

pub use dispatcher::{DispatchError, DispatchReceipt, EventDispatcher};
pub use pipeline::{PipelineConfig, WebhookOutcome, WebhookPipeline};
