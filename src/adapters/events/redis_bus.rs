//! Redis stream event bus for production deployments.
//!
//! Each envelope is appended with `XADD` to the stream named after the
//! target bus. Consumers read the stream with consumer groups and
//! deduplicate on the `dedup-id` field.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::webhook::NormalizedEnvelope;
use crate::ports::{BusError, EventBus, PublishAck};

/// Redis stream transport.
///
/// Cloning is cheap; the multiplexed connection is shared.
#[derive(Clone)]
pub struct RedisEventBus {
    conn: MultiplexedConnection,
}

impl RedisEventBus {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, BusError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e: redis::RedisError| BusError::Transport(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| BusError::Transport(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

/// Field/value pairs written for one envelope, in stream order.
pub(crate) fn stream_fields(envelope: &NormalizedEnvelope) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("envelope-id", envelope.envelope_id.to_string()),
        ("source", envelope.source.clone()),
        ("detail-type", envelope.detail_type.as_str().to_string()),
        ("detail", envelope.detail_json()),
        ("subject", envelope.subject_id.clone()),
        ("occurred-at", envelope.occurred_at.as_unix_secs().to_string()),
    ];
    if let Some(dedup_id) = &envelope.metadata.dedup_id {
        fields.push(("dedup-id", dedup_id.clone()));
    }
    if let Some(correlation_id) = &envelope.metadata.correlation_id {
        fields.push(("correlation-id", correlation_id.clone()));
    }
    fields
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, envelope: &NormalizedEnvelope) -> Result<PublishAck, BusError> {
        let fields = stream_fields(envelope);
        let mut conn = self.conn.clone();

        let entry_id: String = conn
            .xadd(&envelope.event_bus_name, "*", &fields)
            .await
            .map_err(|e: redis::RedisError| BusError::Transport(e.to_string()))?;

        Ok(PublishAck::new(entry_id))
    }

    fn transport(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventBus").finish_non_exhaustive()
    }
}
