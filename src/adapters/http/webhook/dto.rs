//! HTTP DTOs for the webhook endpoint.

use serde::{Deserialize, Serialize};

use crate::application::WebhookOutcome;

/// Body returned for every webhook call, success or failure.
///
/// Only carries the stable code and the fixed public message; internal
/// error detail stays in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// Code for programmatic handling.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl WebhookResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&WebhookOutcome> for WebhookResponse {
    fn from(outcome: &WebhookOutcome) -> Self {
        Self::new(outcome.code, outcome.message)
    }
}
