//! Lifecycle of a single webhook invocation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Stage reached by one pipeline invocation.
///
/// ```text
/// Received ──► Verified ──► Parsed ──► Normalized ──► Dispatched ──► Responded
///    │            │           │  └─────────(filtered)──────────────────▲
///    └────────────┴───────────┴──────────────┴──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Received,
    Verified,
    Parsed,
    Normalized,
    Dispatched,
    Responded,
    Rejected,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::Verified => "verified",
            PipelineState::Parsed => "parsed",
            PipelineState::Normalized => "normalized",
            PipelineState::Dispatched => "dispatched",
            PipelineState::Responded => "responded",
            PipelineState::Rejected => "rejected",
        }
    }
}

impl StateMachine for PipelineState {
    fn valid_transitions(&self) -> Vec<Self> {
        use PipelineState::*;
        match self {
            Received => vec![Verified, Rejected],
            Verified => vec![Parsed, Rejected],
            Parsed => vec![Normalized, Responded, Rejected],
            Normalized => vec![Dispatched, Rejected],
            Dispatched => vec![Responded],
            Responded | Rejected => vec![],
        }
    }
}
