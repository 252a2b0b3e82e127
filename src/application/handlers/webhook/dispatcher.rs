//! EventDispatcher - Publishes normalized envelopes to the bus.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::webhook::{DetailType, NormalizedEnvelope};
use crate::ports::{BusError, EventBus};

/// Dispatch failures. Never retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Publish failed: {0}")]
    Transport(#[from] BusError),
}

/// Proof that the bus accepted an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Bus-assigned entry id.
    pub entry_id: String,
    pub detail_type: DetailType,
    /// Deduplication hint attached to the published envelope.
    pub dedup_id: Option<String>,
}

/// Hands each envelope to the bus exactly once.
///
/// Attaches the dedup and correlation hints but does not deduplicate;
/// downstream consumers own idempotency.
#[derive(Clone)]
pub struct EventDispatcher {
    bus: Arc<dyn EventBus>,
}

impl EventDispatcher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    pub fn transport(&self) -> &'static str {
        self.bus.transport()
    }

    pub async fn dispatch(
        &self,
        envelope: NormalizedEnvelope,
    ) -> Result<DispatchReceipt, DispatchError> {
        let dedup_id = envelope.vendor_event_id.clone();
        let correlation_id = envelope.subject_id.clone();
        let envelope = envelope
            .with_dedup_id(dedup_id)
            .with_correlation_id(correlation_id);

        let ack = self.bus.publish(&envelope).await?;

        tracing::info!(
            transport = self.bus.transport(),
            entry_id = %ack.entry_id,
            detail_type = %envelope.detail_type,
            dedup_id = envelope.metadata.dedup_id.as_deref().unwrap_or("-"),
            "Envelope published"
        );

        Ok(DispatchReceipt {
            entry_id: ack.entry_id,
            detail_type: envelope.detail_type,
            dedup_id: envelope.metadata.dedup_id,
        })
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("transport", &self.bus.transport())
            .finish()
    }
}
