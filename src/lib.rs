//! # `motion_state_controller`
//!
//! A fixed-timestep 2D character motion state machine with physics backend
//! abstraction.
//!
//! This crate turns per-tick boolean signals into character motion:
//! - Edge-tracked input (jump, up, down, left, right) with hold durations
//! - Four-directional contact state (left, right, ceiling, ground)
//! - A closed 13-state movement machine: idle, run start/steady/end, jump
//!   start/normal/spin/end, morph start/steady/end
//! - Per-state velocity integration with run acceleration, braking and
//!   automatic deceleration, jump impulse and terminal fall speed
//! - An animation channel whose phase follows either elapsed time or a
//!   physical quantity (run speed, jump arc)
//! - Physics backend abstraction (Rapier2D included)
//!
//! ## Architecture
//!
//! Each tick, every character's [`CharacterRig`](rig::CharacterRig):
//! 1. Captures input and contacts into edge detectors
//! 2. Asks the state machine for the desired state (pass 1); a change rebinds
//!    the animation and ends the tick
//! 3. Otherwise integrates velocity for the current state and applies gravity
//! 4. Asks again with the new velocity (pass 2), then advances or rebinds the
//!    animation
//! 5. Commits the velocity to the physics body
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use motion_state_controller::prelude::*;
//!
//! // Components for a keyboard-driven character
//! let rig = CharacterRig::new();
//! let config = MotionConfig::pixels(32.0);
//! let input = RawMotionInput::default();
//! let keys = MotionKeyBindings::default();
//!
//! // These are spawned together with physics components
//! ```

use bevy::prelude::*;

pub mod animation;
pub mod backend;
pub mod config;
pub mod contact;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod machine;
pub mod rig;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::animation::{
        AnimationChannel, AnimationDrive, AnimationProvider, MotionAnimator, MotionVisuals,
        NoAnimation,
    };
    pub use crate::backend::{BodyVelocity, ManualBackend, MotionBackend, NoOpBackendPlugin};
    pub use crate::config::{ContactProbeConfig, GravityModel, MotionConfig};
    pub use crate::contact::{ContactDirection, ContactSignals, ContactSnapshot};
    pub use crate::detector::EdgeInputDetector;
    pub use crate::diagnostics::MotionDiagnostics;
    pub use crate::error::{MotionError, Requirement};
    pub use crate::input::{InputSignal, InputSnapshot, MotionKeyBindings, RawMotionInput};
    pub use crate::machine::MotionStateMachine;
    pub use crate::rig::{CharacterRig, TickContext, TickOutcome};
    pub use crate::state::{AnimationIdentity, Facing, MovementState};
    pub use crate::systems::MotionHalted;
    pub use crate::{MotionControllerPlugin, MotionControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{ContactLayers, Rapier2dBackend, Rapier2dMotionBundle};
}

/// Ordering of the controller's work inside `FixedUpdate`.
///
/// The sets are chained in declaration order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MotionControllerSet {
    /// Raw input sampling and config validation.
    Input,
    /// Contact detection by the physics backend.
    Sensors,
    /// The rig tick and velocity write-back.
    Motion,
    /// Facing and animation frames mirrored onto visuals.
    Presentation,
}

/// Main plugin for the motion controller.
///
/// This plugin is generic over a physics backend `B` which mirrors velocity
/// and reports contacts.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(32.0))
///     .add_plugins(MotionControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
///
/// With contacts and velocity supplied by the game:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(MotionControllerPlugin::<ManualBackend>::default())
///     .run();
/// ```
pub struct MotionControllerPlugin<B: backend::MotionBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::MotionBackend> Default for MotionControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::MotionBackend> Plugin for MotionControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::MotionConfig>();
        app.register_type::<config::GravityModel>();
        app.register_type::<config::ContactProbeConfig>();
        app.register_type::<input::RawMotionInput>();
        app.register_type::<input::MotionKeyBindings>();
        app.register_type::<contact::ContactSignals>();
        app.register_type::<state::MovementState>();
        app.register_type::<state::Facing>();
        app.register_type::<rig::CharacterRig>();
        app.register_type::<animation::MotionAnimator>();
        app.register_type::<animation::MotionVisuals>();
        app.register_type::<diagnostics::MotionDiagnostics>();

        app.configure_sets(
            FixedUpdate,
            (
                MotionControllerSet::Input,
                MotionControllerSet::Sensors,
                MotionControllerSet::Motion,
                MotionControllerSet::Presentation,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (
                (systems::read_keyboard_input, systems::validate_motion_configs)
                    .in_set(MotionControllerSet::Input),
                systems::tick_motion_rigs::<B>.in_set(MotionControllerSet::Motion),
                (systems::sync_visual_facing, systems::sync_animator_frames)
                    .in_set(MotionControllerSet::Presentation),
            ),
        );
    }
}
