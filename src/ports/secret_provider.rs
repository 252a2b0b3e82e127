//! SecretProvider port - Interface for retrieving the webhook signing secret.
//!
//! The pipeline never holds a hardcoded secret; every invocation asks a
//! provider for the current key. Providers may cache, so the port also
//! exposes invalidation for the rotation path.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Errors returned by secret providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// No secret is stored under the requested name.
    #[error("Secret not found: '{name}'")]
    NotFound { name: String },

    /// The backing store could not be reached or returned garbage.
    #[error("Secret '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// The webhook signing secret, tagged with where it came from.
///
/// `Debug` output redacts the secret value.
#[derive(Debug, Clone)]
pub struct VerificationKey {
    name: String,
    version: String,
    secret: SecretString,
    loaded_at: Timestamp,
}

impl VerificationKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            secret: SecretString::new(secret.into()),
            loaded_at: Timestamp::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// When the key was fetched from its backing store.
    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }

    /// Raw key bytes for HMAC computation. Never log these.
    pub fn expose_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }
}

/// Port for retrieving the verification key.
///
/// Implementations must be safe to call concurrently from independent
/// invocations.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Retrieves the secret stored under `name` at `version`.
    async fn get_secret(&self, name: &str, version: &str) -> Result<VerificationKey, SecretError>;

    /// Drops any cached copy of the secret so the next call refetches.
    ///
    /// Providers without a cache do nothing.
    async fn invalidate(&self, _name: &str, _version: &str) {}

    /// Provider type name for logging.
    fn provider_type(&self) -> &'static str;
}
