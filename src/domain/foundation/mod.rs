//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects, error types and traits used by every
//! stage of the webhook pipeline.

mod errors;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
