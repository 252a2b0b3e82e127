//! Webhook domain module.
//!
//! Turns an inbound Stripe webhook into a normalized bus envelope.
//!
//! # Module Structure
//!
//! - `request` - Raw inbound request and the verified payload
//! - `signature` - Stripe signature header parsing and HMAC verification
//! - `vendor_event` - Stripe event shape and parser
//! - `detail_type` - Internal event types and the vendor mapping table
//! - `envelope` - Normalized envelope and normalizer
//! - `pipeline_state` - Invocation lifecycle state machine
//! - `errors` - Stage errors and the error taxonomy

mod detail_type;
mod envelope;
mod errors;
mod pipeline_state;
mod request;
mod signature;
mod vendor_event;

pub use detail_type::{lookup as lookup_mapping, supported_event_types, DetailType, EventMapping};
pub use envelope::{EnvelopeMetadata, EventNormalizer, NormalizedEnvelope};
pub use errors::{ErrorCategory, NormalizeError, ParseError, VerificationError, WebhookError};
pub use pipeline_state::PipelineState;
pub use request::{RawWebhookRequest, VerifiedPayload};
pub use signature::{
    sign_payload, signature_header_value, SignatureHeader, SignatureVerifier, DEFAULT_TOLERANCE,
};
pub use vendor_event::{EventParser, VendorEvent, VendorEventData};
