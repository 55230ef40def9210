//! Read-only motion diagnostics.
//!
//! [`MotionDiagnostics`] is rewritten from the rig at the end of every tick
//! for inspectors and debug overlays. Nothing in the controller reads it
//! back, so editing it has no effect on motion.

use bevy::prelude::*;

use crate::contact::ContactSignals;
use crate::input::RawMotionInput;
use crate::state::{Facing, MovementState};

/// Snapshot of a character's motion state after its last tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MotionDiagnostics {
    // === Signals ===
    pub contacts: ContactSignals,
    pub input: RawMotionInput,
    /// Duration of the last completed jump press.
    pub jump_capture_time: f32,
    /// Time the jump input has been held so far.
    pub jump_held_time: f32,

    // === State ===
    pub state: MovementState,
    pub desired_state: MovementState,
    pub velocity: Vec2,
    pub facing: Facing,
    /// Normalized phase of the bound animation.
    pub phase: f32,
    /// The rig faulted and no longer ticks.
    pub halted: bool,
}

impl MotionDiagnostics {
    /// Whether the last transition pass asked for a state other than the current one.
    pub fn transition_pending(&self) -> bool {
        self.state != self.desired_state
    }
}
