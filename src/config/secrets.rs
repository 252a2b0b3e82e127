//! Signing secret configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Longest allowed cache lifetime (one day)
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Where the webhook signing secret lives
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Secret name in the secret store
    #[serde(default = "default_name")]
    pub name: String,

    /// Secret version stage
    #[serde(default = "default_version")]
    pub version: String,

    /// Field holding the signing secret when the value is a JSON document
    #[serde(default = "default_json_key")]
    pub json_key: String,

    /// Cache lifetime in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Environment variable the env provider reads
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

impl SecretsConfig {
    /// Cache lifetime, or `None` when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    /// Validate secrets configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingRequired("SECRETS__NAME"));
        }
        if self.version.is_empty() {
            return Err(ValidationError::MissingRequired("SECRETS__VERSION"));
        }
        if self.env_var.is_empty() {
            return Err(ValidationError::MissingRequired("SECRETS__ENV_VAR"));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ValidationError::InvalidCacheTtl);
        }
        Ok(())
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            json_key: default_json_key(),
            cache_ttl_secs: default_cache_ttl(),
            env_var: default_env_var(),
        }
    }
}

fn default_name() -> String {
    "dev/StripeApp/stripe/secret".to_string()
}

fn default_version() -> String {
    "AWSCURRENT".to_string()
}

fn default_json_key() -> String {
    "stripe-webhook-endpoint-secret".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_env_var() -> String {
    "STRIPE_WEBHOOK_SECRET".to_string()
}
