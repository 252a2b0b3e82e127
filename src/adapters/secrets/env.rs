//! Environment variable secret provider.
//!
//! The variable holds either the raw signing secret (`whsec_...`) or the
//! JSON document a secret store would return, in which case the signing
//! secret is read from `json_key`.

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{SecretError, SecretProvider, VerificationKey};

/// Secret provider that reads one environment variable.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    env_var: String,
    json_key: String,
}

impl EnvSecretProvider {
    pub fn new(env_var: impl Into<String>, json_key: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            json_key: json_key.into(),
        }
    }

    /// Pulls the signing secret out of a raw or JSON-wrapped value.
    fn extract(&self, name: &str, value: &str) -> Result<String, SecretError> {
        let trimmed = value.trim();
        if !trimmed.starts_with('{') {
            return Ok(trimmed.to_string());
        }

        let document: Value = serde_json::from_str(trimmed).map_err(|e| SecretError::Unavailable {
            name: name.to_string(),
            reason: format!("secret document is not valid JSON: {e}"),
        })?;

        match document.get(&self.json_key).and_then(Value::as_str) {
            Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
            _ => Err(SecretError::NotFound {
                name: format!("{}#{}", name, self.json_key),
            }),
        }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, name: &str, version: &str) -> Result<VerificationKey, SecretError> {
        match std::env::var(&self.env_var) {
            Ok(value) if !value.trim().is_empty() => {
                let secret = self.extract(name, &value)?;
                tracing::debug!(
                    secret_name = name,
                    env_var = %self.env_var,
                    "Secret loaded from environment variable"
                );
                Ok(VerificationKey::new(name, version, secret))
            }
            // Empty value treated as not found
            _ => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn provider_type(&self) -> &'static str {
        "env"
    }
}
