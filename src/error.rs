//! Errors reported by the motion core.

use thiserror::Error;

use crate::state::MovementState;

/// Physical condition a state depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Grounded,
    Airborne,
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Grounded => f.write_str("ground contact"),
            Requirement::Airborne => f.write_str("no ground contact"),
        }
    }
}

/// Unrecoverable motion failures.
///
/// A precondition violation means the transition table and the contact
/// provider disagree about where the character is. The rig stops ticking
/// after the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error("{state:?} requires {requirement}")]
    PreconditionViolated {
        state: MovementState,
        requirement: Requirement,
    },

    #[error("invalid motion config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },
}

impl MotionError {
    pub(crate) fn requires_ground(state: MovementState) -> Self {
        MotionError::PreconditionViolated {
            state,
            requirement: Requirement::Grounded,
        }
    }

    pub(crate) fn requires_air(state: MovementState) -> Self {
        MotionError::PreconditionViolated {
            state,
            requirement: Requirement::Airborne,
        }
    }
}
