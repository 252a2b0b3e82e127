//! Stripe webhook signature verification.
//!
//! Verifies the `Stripe-Signature` header using HMAC-SHA256 over
//! `"{timestamp}.{raw body}"`, with timestamp validation against the
//! receipt time to reject replays.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::VerificationError;
use super::request::VerifiedPayload;
use crate::domain::foundation::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for a signature timestamp (5 minutes).
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Maximum allowed clock skew for future timestamps (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// The only signature scheme the processor signs live events with.
const SIGNATURE_SCHEME: &str = "v1";

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// All v1 signatures (more than one while a secret is being rolled).
    pub signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...][,v0=<legacy>]`
    ///
    /// Unknown schemes are skipped for forward compatibility, and so are
    /// `v1` values that are not valid hex; they can never match.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::SignatureMalformed` if a pair has no `=`,
    /// the timestamp is missing or invalid, or no decodable `v1` remains.
    pub fn parse(header: &str) -> Result<Self, VerificationError> {
        let mut timestamp: Option<i64> = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| malformed("invalid header format"))?;

            match key {
                "t" => {
                    if timestamp.is_some() {
                        return Err(malformed("duplicate timestamp"));
                    }
                    timestamp = Some(value.parse().map_err(|_| malformed("invalid timestamp"))?);
                }
                SIGNATURE_SCHEME => {
                    if let Ok(signature) = hex::decode(value) {
                        signatures.push(signature);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| malformed("missing timestamp"))?;
        if signatures.is_empty() {
            return Err(malformed("missing v1 signature"));
        }

        Ok(SignatureHeader {
            timestamp,
            signatures,
        })
    }
}

fn malformed(reason: &str) -> VerificationError {
    VerificationError::SignatureMalformed(reason.to_string())
}

/// Verifier for Stripe webhook signatures.
///
/// Holds only the tolerance window; the secret is supplied per call so a
/// freshly rotated key can be used without rebuilding the verifier.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerifier {
    tolerance: Duration,
}

impl SignatureVerifier {
    /// Creates a verifier with the given replay tolerance window.
    pub fn new(tolerance: Duration) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Verifies the signature header against the raw body.
    ///
    /// # Verification Steps
    ///
    /// 1. Require a non-blank header
    /// 2. Parse the signature header
    /// 3. Validate the timestamp against `received_at`
    /// 4. Compute the expected HMAC-SHA256 digest
    /// 5. Compare against every v1 signature in constant time
    ///
    /// # Errors
    ///
    /// - `SignatureMissing` - No header, or a blank one
    /// - `SignatureMalformed` - Header could not be parsed
    /// - `TimestampExpired` - Timestamp older than the tolerance window
    /// - `TimestampInFuture` - Timestamp ahead beyond clock skew
    /// - `SignatureMismatch` - No signature matched
    pub fn verify<'a>(
        &self,
        payload: &'a [u8],
        signature_header: Option<&str>,
        secret: &[u8],
        received_at: Timestamp,
    ) -> Result<VerifiedPayload<'a>, VerificationError> {
        // 1. Require header
        let raw_header = signature_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(VerificationError::SignatureMissing)?;

        // 2. Parse signature header
        let header = SignatureHeader::parse(raw_header)?;

        // 3. Validate timestamp
        let signed_at = self.validate_timestamp(header.timestamp, received_at)?;

        // 4. Compute expected signature
        let expected = compute_signature(secret, header.timestamp, payload);

        // 5. Compare every candidate; no early exit
        let matched = header
            .signatures
            .iter()
            .fold(false, |found, candidate| {
                found | constant_time_compare(&expected, candidate)
            });
        if !matched {
            return Err(VerificationError::SignatureMismatch);
        }

        Ok(VerifiedPayload::new(payload, signed_at, received_at))
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(
        &self,
        timestamp: i64,
        received_at: Timestamp,
    ) -> Result<Timestamp, VerificationError> {
        let signed_at = Timestamp::from_unix_secs(timestamp)
            .ok_or_else(|| malformed("timestamp out of range"))?;
        let age = received_at.as_unix_secs().saturating_sub(timestamp);
        let tolerance = i64::try_from(self.tolerance.as_secs()).unwrap_or(i64::MAX);

        if age > tolerance {
            return Err(VerificationError::TimestampExpired { age_secs: age });
        }

        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(VerificationError::TimestampInFuture { skew_secs: -age });
        }

        Ok(signed_at)
    }
}

impl Default for SignatureVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

/// Computes the HMAC-SHA256 digest over `"{timestamp}.{payload}"`.
fn compute_signature(secret: &[u8], timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Hex-encoded v1 signature for a payload, as the processor would send it.
///
/// Fixture helper for tests and local replay tooling; the request path
/// never signs anything.
pub fn sign_payload(secret: &[u8], timestamp: i64, payload: &[u8]) -> String {
    hex::encode(compute_signature(secret, timestamp, payload))
}

/// Full `Stripe-Signature` header value for a payload.
///
/// Fixture helper for tests and local replay tooling. Exported so the
/// `tests/` integration suites can build deliveries the verifier accepts.
pub fn signature_header_value(secret: &[u8], timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},{}={}",
        timestamp,
        SIGNATURE_SCHEME,
        sign_payload(secret, timestamp, payload)
    )
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
