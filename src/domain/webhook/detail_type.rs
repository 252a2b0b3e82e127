//! Internal event types and the vendor type mapping table.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Internal event type published on the bus.
///
/// Closed: a vendor event type with no entry in the mapping table never
/// becomes a `DetailType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailType {
    CustomerCreated,
}

impl DetailType {
    /// Wire name used as the bus `detail-type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailType::CustomerCreated => "CustomerCreated",
        }
    }
}

impl fmt::Display for DetailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one vendor event type is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMapping {
    pub detail_type: DetailType,
    /// Field of `data.object` holding the subject identifier.
    pub subject_field: &'static str,
}

static EVENT_MAPPINGS: Lazy<HashMap<&'static str, EventMapping>> = Lazy::new(|| {
    let customer_created = EventMapping {
        detail_type: DetailType::CustomerCreated,
        subject_field: "id",
    };

    HashMap::from([
        ("customer.subscription.created", customer_created),
        ("customer.created", customer_created),
    ])
});

/// Looks up the mapping for a vendor event type. Matching is exact.
pub fn lookup(vendor_event_type: &str) -> Option<EventMapping> {
    EVENT_MAPPINGS.get(vendor_event_type).copied()
}

/// Vendor event types with a mapping, sorted.
pub fn supported_event_types() -> Vec<&'static str> {
    let mut types: Vec<_> = EVENT_MAPPINGS.keys().copied().collect();
    types.sort_unstable();
    types
}
