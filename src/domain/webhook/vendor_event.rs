//! Stripe webhook event types and parser.
//!
//! Only the fields the pipeline relies on are captured; everything else in
//! Stripe's event schema is ignored so new API versions keep decoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::ParseError;
use super::request::VerifiedPayload;

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VendorEvent {
    /// Unique identifier for the event (evt_xxx format), the idempotency key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Type of event (e.g., "customer.subscription.created").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Object containing event-specific data.
    pub data: VendorEventData,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,

    /// Whether this is a live mode event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livemode: Option<bool>,

    /// API version used to render this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VendorEventData {
    /// The object that triggered the event (shape depends on event type).
    pub object: Map<String, Value>,

    /// Previous values for updated attributes (only for update events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<Value>,
}

impl VendorEvent {
    /// Returns a string field of `data.object`, if present and a string.
    pub fn object_str(&self, field: &str) -> Option<&str> {
        self.data.object.get(field).and_then(Value::as_str)
    }

    /// Returns true if the processor flagged this as a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode.unwrap_or(false)
    }
}

/// Decodes verified bodies into `VendorEvent`s.
///
/// Decoding happens in two passes so a body that is not JSON at all
/// (`MalformedPayload`) is told apart from JSON with the wrong shape
/// (`SchemaViolation`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EventParser;

impl EventParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a raw body.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` - Body is not valid JSON
    /// - `SchemaViolation` - `type` or `data.object` missing or mistyped
    pub fn parse(&self, body: &[u8]) -> Result<VendorEvent, ParseError> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| ParseError::MalformedPayload(e.to_string()))?;

        if !document.is_object() {
            return Err(ParseError::SchemaViolation(
                "event document is not an object".to_string(),
            ));
        }

        serde_json::from_value(document).map_err(|e| ParseError::SchemaViolation(e.to_string()))
    }

    /// Parses the body of a verified payload.
    pub fn parse_verified(&self, payload: &VerifiedPayload<'_>) -> Result<VendorEvent, ParseError> {
        self.parse(payload.body())
    }
}

/// Builder for creating test VendorEvent instances.
#[cfg(test)]
pub struct VendorEventBuilder {
    id: Option<String>,
    event_type: String,
    object: Value,
    created: Option<i64>,
}

#[cfg(test)]
impl Default for VendorEventBuilder {
    fn default() -> Self {
        Self {
            id: Some("evt_test_123".to_string()),
            event_type: "customer.subscription.created".to_string(),
            object: serde_json::json!({ "id": "cus_123" }),
            created: None,
        }
    }
}

#[cfg(test)]
impl VendorEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Option<&str>) -> Self {
        self.id = id.map(str::to_string);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: Value) -> Self {
        self.object = object;
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = Some(created);
        self
    }

    pub fn build(self) -> VendorEvent {
        let object = match self.object {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        VendorEvent {
            id: self.id,
            event_type: self.event_type,
            data: VendorEventData {
                object,
                previous_attributes: None,
            },
            created: self.created,
            livemode: None,
            api_version: None,
        }
    }
}
