//! Normalized envelope and the normalizer that builds it.
//!
//! The envelope is the only shape that leaves the domain for the bus. It
//! carries the internal `DetailType`, so an unmapped vendor event can never
//! be represented here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::detail_type::{self, DetailType};
use super::errors::NormalizeError;
use super::vendor_event::VendorEvent;
use crate::domain::foundation::Timestamp;

/// Correlation and deduplication hints for downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// Vendor event id; consumers deduplicate on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_id: Option<String>,

    /// Links every event about the same subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Transport envelope for a normalized vendor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEnvelope {
    /// Unique id for this envelope instance.
    pub envelope_id: Uuid,

    /// Target bus.
    pub event_bus_name: String,

    /// Logical producer of the event.
    pub source: String,

    /// Internal event type used for routing.
    pub detail_type: DetailType,

    /// Event payload, always a JSON object.
    pub detail: Value,

    /// Identifier of the entity the event is about.
    pub subject_id: String,

    /// Vendor event id, when the vendor supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_event_id: Option<String>,

    /// When the vendor says the event happened.
    pub occurred_at: Timestamp,

    pub metadata: EnvelopeMetadata,
}

impl NormalizedEnvelope {
    /// Sets the deduplication hint.
    pub fn with_dedup_id(mut self, dedup_id: Option<String>) -> Self {
        self.metadata.dedup_id = dedup_id;
        self
    }

    /// Sets the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(correlation_id.into());
        self
    }

    /// The vendor event type recorded in the detail payload.
    pub fn vendor_event_type(&self) -> Option<&str> {
        self.detail.get("vendorEventType").and_then(Value::as_str)
    }

    /// Serializes the detail payload for transports that carry it as text.
    pub fn detail_json(&self) -> String {
        self.detail.to_string()
    }
}

/// Maps vendor events onto internal envelopes.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    event_bus_name: String,
    source: String,
}

impl EventNormalizer {
    pub fn new(event_bus_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            event_bus_name: event_bus_name.into(),
            source: source.into(),
        }
    }

    pub fn event_bus_name(&self) -> &str {
        &self.event_bus_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Normalizes a parsed vendor event.
    ///
    /// # Errors
    ///
    /// - `UnsupportedEvent` - Vendor type has no mapping (filter, not a failure)
    /// - `MissingSubjectId` - Mapped subject field absent, empty or not a string
    pub fn normalize(
        &self,
        event: &VendorEvent,
        received_at: Timestamp,
    ) -> Result<NormalizedEnvelope, NormalizeError> {
        let mapping = detail_type::lookup(&event.event_type)
            .ok_or_else(|| NormalizeError::UnsupportedEvent(event.event_type.clone()))?;

        let subject_id = event
            .object_str(mapping.subject_field)
            .filter(|id| !id.is_empty())
            .ok_or(NormalizeError::MissingSubjectId(mapping.subject_field))?
            .to_string();

        let occurred_at = event
            .created
            .and_then(Timestamp::from_unix_secs)
            .unwrap_or(received_at);

        let detail = json!({
            "vendorEventType": event.event_type,
            "stripeEvent": [event.event_type],
            "subjectId": subject_id,
        });

        Ok(NormalizedEnvelope {
            envelope_id: Uuid::new_v4(),
            event_bus_name: self.event_bus_name.clone(),
            source: self.source.clone(),
            detail_type: mapping.detail_type,
            detail,
            subject_id,
            vendor_event_id: event.id.clone(),
            occurred_at,
            metadata: EnvelopeMetadata::default(),
        })
    }
}
