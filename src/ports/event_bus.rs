//! EventBus port - Interface for publishing normalized envelopes.
//!
//! This port defines how the pipeline hands events to the internal bus
//! without knowing about the underlying transport (in-memory, Redis, etc.).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::webhook::NormalizedEnvelope;

/// Errors returned by bus transports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The transport could not be reached or failed mid-call.
    #[error("Bus transport error: {0}")]
    Transport(String),

    /// The bus received the envelope but refused it.
    #[error("Bus rejected event: {0}")]
    Rejected(String),
}

/// Acknowledgement returned once the bus has accepted an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAck {
    /// Transport-assigned identifier of the stored entry.
    pub entry_id: String,
}

impl PublishAck {
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
        }
    }
}

/// Port for publishing envelopes to the internal event bus.
///
/// Implementations must:
/// - Return only after the transport has accepted the envelope
/// - Propagate transport failures instead of retrying internally
///
/// ```ignore
/// let ack = bus.publish(&envelope).await?;
/// tracing::info!(entry_id = %ack.entry_id, "published");
/// ```
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes a single envelope.
    async fn publish(&self, envelope: &NormalizedEnvelope) -> Result<PublishAck, BusError>;

    /// Transport name for logging.
    fn transport(&self) -> &'static str;
}
