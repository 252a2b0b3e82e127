//! In-memory secret provider for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::ports::{SecretError, SecretProvider, VerificationKey};

/// Secret provider backed by a map.
///
/// Counts fetches so tests can observe caching and refetch behavior.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
#[derive(Debug, Default)]
pub struct InMemorySecretProvider {
    secrets: RwLock<HashMap<(String, String), String>>,
    failure: RwLock<Option<SecretError>>,
    fetches: AtomicUsize,
}

impl InMemorySecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider holding one secret.
    pub fn with_secret(
        name: impl Into<String>,
        version: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let provider = Self::new();
        provider.rotate(name, version, secret);
        provider
    }

    /// Replaces the secret stored under `name`/`version`.
    pub fn rotate(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
        secret: impl Into<String>,
    ) {
        self.secrets
            .write()
            .expect("InMemorySecretProvider: secrets write lock poisoned")
            .insert((name.into(), version.into()), secret.into());
    }

    /// Makes every subsequent fetch fail with `error` until cleared.
    pub fn fail_with(&self, error: SecretError) {
        *self
            .failure
            .write()
            .expect("InMemorySecretProvider: failure write lock poisoned") = Some(error);
    }

    pub fn clear_failure(&self) {
        *self
            .failure
            .write()
            .expect("InMemorySecretProvider: failure write lock poisoned") = None;
    }

    /// Number of `get_secret` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for InMemorySecretProvider {
    async fn get_secret(&self, name: &str, version: &str) -> Result<VerificationKey, SecretError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .failure
            .read()
            .expect("InMemorySecretProvider: failure lock poisoned")
            .clone()
        {
            return Err(error);
        }

        self.secrets
            .read()
            .expect("InMemorySecretProvider: secrets lock poisoned")
            .get(&(name.to_string(), version.to_string()))
            .map(|secret| VerificationKey::new(name, version, secret.clone()))
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }

    fn provider_type(&self) -> &'static str {
        "memory"
    }
}
