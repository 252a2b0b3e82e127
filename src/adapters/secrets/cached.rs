//! TTL cache in front of any secret provider.
//!
//! Avoids a secret-store round trip per webhook. The pipeline invalidates
//! the entry when a signature fails to verify, so a rotated secret is
//! picked up on the next attempt instead of after the TTL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{SecretError, SecretProvider, VerificationKey};

#[derive(Debug, Clone)]
struct CachedKey {
    key: VerificationKey,
    expires_at: Timestamp,
}

/// A `SecretProvider` wrapper that adds TTL-based caching.
///
/// When the inner provider fails and an expired entry is still held, the
/// stale key is served (degraded mode). Invalidated entries are gone for
/// good and never served stale.
pub struct CachedSecretProvider {
    inner: Arc<dyn SecretProvider>,
    entries: RwLock<HashMap<String, CachedKey>>,
    ttl: Duration,
}

impl CachedSecretProvider {
    pub fn new(inner: Arc<dyn SecretProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn cache_key(name: &str, version: &str) -> String {
        format!("{name}@{version}")
    }

    async fn lookup(&self, cache_key: &str, allow_expired: bool) -> Option<VerificationKey> {
        let entries = self.entries.read().await;
        entries.get(cache_key).and_then(|cached| {
            if allow_expired || Timestamp::now().is_before(&cached.expires_at) {
                Some(cached.key.clone())
            } else {
                None
            }
        })
    }
}

impl std::fmt::Debug for CachedSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSecretProvider")
            .field("provider_type", &self.inner.provider_type())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[async_trait]
impl SecretProvider for CachedSecretProvider {
    async fn get_secret(&self, name: &str, version: &str) -> Result<VerificationKey, SecretError> {
        let cache_key = Self::cache_key(name, version);

        if let Some(key) = self.lookup(&cache_key, false).await {
            tracing::debug!(secret_name = name, "Secret cache hit");
            return Ok(key);
        }

        tracing::debug!(secret_name = name, "Secret cache miss, fetching from provider");

        match self.inner.get_secret(name, version).await {
            Ok(key) => {
                tracing::info!(
                    secret_name = name,
                    provider = self.inner.provider_type(),
                    "Secret loaded from provider"
                );
                match Timestamp::now().checked_plus(self.ttl) {
                    Some(expires_at) => {
                        self.entries.write().await.insert(
                            cache_key,
                            CachedKey {
                                key: key.clone(),
                                expires_at,
                            },
                        );
                    }
                    None => tracing::warn!(
                        secret_name = name,
                        ttl_secs = self.ttl.as_secs(),
                        "Cache TTL out of range, secret not cached"
                    ),
                }
                Ok(key)
            }
            Err(e) => {
                if let Some(stale) = self.lookup(&cache_key, true).await {
                    tracing::warn!(
                        secret_name = name,
                        provider = self.inner.provider_type(),
                        error = %e,
                        "Provider unavailable, using stale cached secret"
                    );
                    return Ok(stale);
                }
                Err(e)
            }
        }
    }

    async fn invalidate(&self, name: &str, version: &str) {
        self.entries
            .write()
            .await
            .remove(&Self::cache_key(name, version));
        self.inner.invalidate(name, version).await;
        tracing::debug!(secret_name = name, "Secret cache entry invalidated");
    }

    fn provider_type(&self) -> &'static str {
        self.inner.provider_type()
    }
}
