//! Secret provider adapters.
//!
//! - `EnvSecretProvider` - Reads the signing secret from an environment variable
//! - `InMemorySecretProvider` - Fixed, rotatable secrets for tests
//! - `CachedSecretProvider` - TTL cache wrapping any provider

mod cached;
mod env;
mod in_memory;

pub use cached::CachedSecretProvider;
pub use env::EnvSecretProvider;
pub use in_memory::InMemorySecretProvider;
