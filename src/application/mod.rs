//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    DispatchError, DispatchReceipt, EventDispatcher, PipelineConfig, WebhookOutcome,
    WebhookPipeline,
};
