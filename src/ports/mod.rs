//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and the outside world. Adapters implement these ports.
//!
//! - `SecretProvider` - Retrieves the webhook signing secret
//! - `EventBus` - Publishes normalized envelopes

mod event_bus;
mod secret_provider;

pub use event_bus::{BusError, EventBus, PublishAck};
pub use secret_provider::{SecretError, SecretProvider, VerificationKey};
