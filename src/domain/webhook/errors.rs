//! Webhook error types.
//!
//! Each pipeline stage has its own error enum. `WebhookError` folds them
//! together and maps every failure onto the error taxonomy, an HTTP status
//! code and a fixed public message. Internal detail stays in `Display` for
//! logging and never reaches the response body.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// Signature verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// No signature header on the request.
    #[error("Signature header missing")]
    SignatureMissing,

    /// Header present but could not be parsed.
    #[error("Signature header malformed: {0}")]
    SignatureMalformed(String),

    /// No signature component matched the expected digest.
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// Signature timestamp is older than the tolerance window.
    #[error("Signature timestamp expired ({age_secs}s old)")]
    TimestampExpired { age_secs: i64 },

    /// Signature timestamp is ahead of the receipt time beyond clock skew.
    #[error("Signature timestamp in the future ({skew_secs}s ahead)")]
    TimestampInFuture { skew_secs: i64 },
}

/// Payload decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Body is not a JSON document.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// JSON document lacks `type` or `data.object`, or they have the wrong shape.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

/// Normalization outcomes that stop the pipeline before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Vendor event type has no entry in the mapping table (filtered, not a failure).
    #[error("Unsupported event type: {0}")]
    UnsupportedEvent(String),

    /// Subject identifier absent, empty or not a string.
    #[error("Missing subject id: data.object.{0}")]
    MissingSubjectId(&'static str),
}

/// Error taxonomy used for response mapping and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad, missing or expired signature.
    AuthenticationFailure,
    /// Malformed or schema-violating payload.
    ValidationFailure,
    /// Recognized payload with an unmapped type.
    UnsupportedEvent,
    /// Secret retrieval, bus publish or timeout.
    DependencyFailure,
}

/// Any failure of a single pipeline invocation.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The verification secret could not be retrieved.
    #[error("Secret unavailable: {0}")]
    SecretUnavailable(String),

    /// The event bus did not accept the envelope.
    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    /// The invocation exceeded its time budget.
    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),
}

impl WebhookError {
    /// Classifies the error into the taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            WebhookError::Verification(_) => ErrorCategory::AuthenticationFailure,
            WebhookError::Parse(_) | WebhookError::Normalize(NormalizeError::MissingSubjectId(_)) => {
                ErrorCategory::ValidationFailure
            }
            WebhookError::Normalize(NormalizeError::UnsupportedEvent(_)) => {
                ErrorCategory::UnsupportedEvent
            }
            WebhookError::SecretUnavailable(_)
            | WebhookError::DispatchFailed(_)
            | WebhookError::Timeout(_) => ErrorCategory::DependencyFailure,
        }
    }

    /// Returns true if the caller's environment should redeliver.
    ///
    /// The pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::DependencyFailure
    }

    /// Maps the error to the status code returned to the processor.
    ///
    /// - 2xx: acknowledged, no redelivery
    /// - 4xx: client-caused, no redelivery
    /// - 5xx: server-caused, processor redelivers
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Verification(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Parse(_) | WebhookError::Normalize(NormalizeError::MissingSubjectId(_)) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Normalize(NormalizeError::UnsupportedEvent(_)) => StatusCode::OK,
            WebhookError::SecretUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WebhookError::DispatchFailed(_) => StatusCode::BAD_GATEWAY,
            WebhookError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Stable machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            WebhookError::Verification(_) => "INVALID_SIGNATURE",
            WebhookError::Parse(_) | WebhookError::Normalize(NormalizeError::MissingSubjectId(_)) => {
                "INVALID_PAYLOAD"
            }
            WebhookError::Normalize(NormalizeError::UnsupportedEvent(_)) => "EVENT_IGNORED",
            WebhookError::SecretUnavailable(_) => "SECRET_UNAVAILABLE",
            WebhookError::DispatchFailed(_) => "DISPATCH_FAILED",
            WebhookError::Timeout(_) => "TIMEOUT",
        }
    }

    /// Short message safe to return to the processor.
    pub fn public_message(&self) -> &'static str {
        match self.category() {
            ErrorCategory::AuthenticationFailure => "Signature verification failed",
            ErrorCategory::ValidationFailure => "Invalid webhook payload",
            ErrorCategory::UnsupportedEvent => "Event type not handled",
            ErrorCategory::DependencyFailure => "Temporary failure, retry later",
        }
    }
}
