//! Domain layer containing the webhook pipeline's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, validation errors, state machines)
//! - `webhook` - Signature verification, parsing and normalization of Stripe events
//!
//! Nothing in this layer performs I/O; secrets and the bus are reached
//! through `crate::ports`.

pub mod foundation;
pub mod webhook;
