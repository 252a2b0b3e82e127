//! Event bus adapters.
//!
//! Adapters implement the `EventBus` port for different environments:
//!
//! - `InMemoryEventBus` - In-process bus for tests and local development
//! - `RedisEventBus` - Redis stream transport for production

mod in_memory;
mod redis_bus;

pub use in_memory::InMemoryEventBus;
pub use redis_bus::RedisEventBus;
