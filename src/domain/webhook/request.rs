//! Inbound request types.

use http::{HeaderMap, HeaderValue};

use crate::domain::foundation::Timestamp;

/// An inbound webhook call exactly as received.
///
/// Created once per invocation and never mutated. Header lookup is
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct RawWebhookRequest {
    body: Vec<u8>,
    headers: HeaderMap,
    received_at: Timestamp,
}

impl RawWebhookRequest {
    pub fn new(body: impl Into<Vec<u8>>, headers: HeaderMap, received_at: Timestamp) -> Self {
        Self {
            body: body.into(),
            headers,
            received_at,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }
}

/// Raw body plus proof that its signature checked out.
///
/// Only `SignatureVerifier` constructs this, so holding one means the
/// body is authentic. Borrows the body from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedPayload<'a> {
    body: &'a [u8],
    signed_at: Timestamp,
    verified_at: Timestamp,
}

impl<'a> VerifiedPayload<'a> {
    pub(super) fn new(body: &'a [u8], signed_at: Timestamp, verified_at: Timestamp) -> Self {
        Self {
            body,
            signed_at,
            verified_at,
        }
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// Timestamp embedded in the signature header.
    pub fn signed_at(&self) -> Timestamp {
        self.signed_at
    }

    /// Receipt time the signature was checked against.
    pub fn verified_at(&self) -> Timestamp {
        self.verified_at
    }
}
