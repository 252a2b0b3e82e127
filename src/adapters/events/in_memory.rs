//! In-memory event bus implementation for testing and local development.
//!
//! Records every accepted envelope so tests can assert on exactly what
//! reached the bus.
//!
//! # Security Note
//!
//! This adapter is not for production. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned, and nothing it
//! records survives a restart. Production uses `RedisEventBus`.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::domain::webhook::{DetailType, NormalizedEnvelope};
use crate::ports::{BusError, EventBus, PublishAck};

/// Envelopes kept by `InMemoryEventBus::new`; older ones are dropped.
pub const DEFAULT_RETAINED_EVENTS: usize = 10_000;

/// In-memory event bus.
///
/// Features:
/// - Envelope capture for assertions
/// - Injectable failure to exercise dependency-failure paths
/// - Injectable latency to exercise invocation timeouts
/// - Bounded retention; the oldest envelopes are dropped first
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// dispatcher.dispatch(envelope).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event(DetailType::CustomerCreated));
/// ```
pub struct InMemoryEventBus {
    published: RwLock<VecDeque<NormalizedEnvelope>>,
    retain: usize,
    sequence: AtomicU64,
    failure: RwLock<Option<BusError>>,
    latency: RwLock<Option<Duration>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus keeping `DEFAULT_RETAINED_EVENTS`.
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETAINED_EVENTS)
    }

    /// Creates a bus that keeps at most `retain` envelopes (minimum 1).
    pub fn with_retention(retain: usize) -> Self {
        Self {
            published: RwLock::new(VecDeque::new()),
            retain: retain.max(1),
            sequence: AtomicU64::new(0),
            failure: RwLock::new(None),
            latency: RwLock::new(None),
        }
    }

    /// Makes every subsequent publish fail with `error` until cleared.
    pub fn fail_with(&self, error: BusError) {
        *self
            .failure
            .write()
            .expect("InMemoryEventBus: failure write lock poisoned") = Some(error);
    }

    /// Restores normal publishing after `fail_with`.
    pub fn clear_failure(&self) {
        *self
            .failure
            .write()
            .expect("InMemoryEventBus: failure write lock poisoned") = None;
    }

    /// Delays every subsequent publish by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self
            .latency
            .write()
            .expect("InMemoryEventBus: latency write lock poisoned") = Some(latency);
    }

    // === Test Helpers ===

    /// Returns all retained envelopes, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn published_events(&self) -> Vec<NormalizedEnvelope> {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Returns envelopes of a specific detail type.
    pub fn events_of_type(&self, detail_type: DetailType) -> Vec<NormalizedEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.detail_type == detail_type)
            .collect()
    }

    /// Returns envelopes about a specific subject.
    pub fn events_for_subject(&self, subject_id: &str) -> Vec<NormalizedEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.subject_id == subject_id)
            .collect()
    }

    /// Clears all published envelopes (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .clear();
    }

    /// Returns count of retained envelopes.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .len()
    }

    /// Checks if an envelope of the given detail type was published.
    pub fn has_event(&self, detail_type: DetailType) -> bool {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .iter()
            .any(|e| e.detail_type == detail_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: &NormalizedEnvelope) -> Result<PublishAck, BusError> {
        // Copy out before awaiting so no lock guard crosses the await
        let latency = *self
            .latency
            .read()
            .expect("InMemoryEventBus: latency lock poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self
            .failure
            .read()
            .expect("InMemoryEventBus: failure lock poisoned")
            .clone()
        {
            return Err(error);
        }

        let mut published = self
            .published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned");
        if published.len() >= self.retain {
            published.pop_front();
        }
        published.push_back(envelope.clone());
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(PublishAck::new(format!("mem-{n}")))
    }

    fn transport(&self) -> &'static str {
        "memory"
    }
}
