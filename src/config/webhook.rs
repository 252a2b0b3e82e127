//! Webhook endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Inbound webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Header carrying the Stripe signature
    #[serde(default = "default_signature_header")]
    pub signature_header: String,

    /// Maximum signature age in seconds
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: u64,

    /// Budget for a whole invocation in seconds
    #[serde(default = "default_invocation_timeout")]
    pub invocation_timeout_secs: u64,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl WebhookConfig {
    pub fn tolerance(&self) -> Duration {
        Duration::from_secs(self.tolerance_secs)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }

    /// Validate webhook configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if http::HeaderName::from_bytes(self.signature_header.as_bytes()).is_err() {
            return Err(ValidationError::InvalidHeaderName(
                self.signature_header.clone(),
            ));
        }
        if self.tolerance_secs == 0 || self.tolerance_secs > 3600 {
            return Err(ValidationError::InvalidTolerance);
        }
        if self.invocation_timeout_secs == 0 || self.invocation_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_body_bytes == 0 {
            return Err(ValidationError::InvalidBodyLimit);
        }
        Ok(())
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            signature_header: default_signature_header(),
            tolerance_secs: default_tolerance(),
            invocation_timeout_secs: default_invocation_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_signature_header() -> String {
    "Stripe-Signature".to_string()
}

fn default_tolerance() -> u64 {
    300
}

fn default_invocation_timeout() -> u64 {
    8
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}
