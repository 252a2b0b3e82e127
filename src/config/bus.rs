//! Event bus configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Bus transport selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusTransport {
    /// In-process bus (development and tests only)
    #[default]
    Memory,
    /// Redis stream named after the bus
    Redis,
}

/// Outbound event bus configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Target bus name (Redis stream key)
    #[serde(default = "default_event_bus_name")]
    pub event_bus_name: String,

    /// Source recorded on every envelope
    #[serde(default = "default_source")]
    pub source: String,

    /// Transport used to publish
    #[serde(default)]
    pub transport: BusTransport,

    /// Redis connection URL (required for the redis transport)
    pub redis_url: Option<String>,
}

impl BusConfig {
    /// Validate bus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.event_bus_name.is_empty() {
            return Err(ValidationError::MissingRequired("BUS__EVENT_BUS_NAME"));
        }
        if self.source.is_empty() {
            return Err(ValidationError::MissingRequired("BUS__SOURCE"));
        }
        if self.transport == BusTransport::Redis {
            let url = self
                .redis_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .ok_or(ValidationError::MissingRequired("BUS__REDIS_URL"))?;
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            event_bus_name: default_event_bus_name(),
            source: default_source(),
            transport: BusTransport::default(),
            redis_url: None,
        }
    }
}

fn default_event_bus_name() -> String {
    "stripeAppEventBus".to_string()
}

fn default_source() -> String {
    "stripeWebHookHandler.lambda".to_string()
}
