//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the pipeline to external systems:
//! - `events` - Event bus implementations (in-memory, Redis streams)
//! - `secrets` - Signing secret providers (environment, in-memory, cached)
//! - `http` - Axum router exposing the webhook endpoint

pub mod events;
pub mod http;
pub mod secrets;

pub use events::{InMemoryEventBus, RedisEventBus};
pub use secrets::{CachedSecretProvider, EnvSecretProvider, InMemorySecretProvider};
