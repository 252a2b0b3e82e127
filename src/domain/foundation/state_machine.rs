//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum the same validated `transition_to` and
//! terminal-state checks. The webhook pipeline state is the main implementor.

use super::ValidationError;

/// Trait for enums that represent a state machine.
///
/// Implementors only declare the transition table; validated transitions
/// and terminal checks come for free.
///
/// ```ignore
/// let state = PipelineState::Received.transition_to(PipelineState::Verified)?;
/// assert!(!state.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition, rejecting moves outside the table.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
