//! The per-character motion rig.
//!
//! [`CharacterRig`] owns a character's velocity, facing, input and contact
//! snapshots and animation channel, and runs one fixed tick in a strict
//! order:
//!
//! 1. capture input, then contacts
//! 2. pass 1: compute the desired state from the previous tick's velocity
//! 3. if the state changed, rebind the animation channel and stop; the tick
//!    integrates nothing and commits nothing
//! 4. otherwise integrate the current state, apply gravity, and run pass 2
//!    on the new velocity
//! 5. advance the channel (or rebind it when pass 2 changed the state)
//! 6. commit the velocity
//!
//! The velocity held by the rig is the source of truth. The physics body is
//! read once at the start of the tick and written once at the end.

use bevy::prelude::*;

use crate::animation::{AnimationChannel, AnimationProvider};
use crate::config::MotionConfig;
use crate::contact::{ContactSignals, ContactSnapshot};
use crate::diagnostics::MotionDiagnostics;
use crate::error::MotionError;
use crate::input::{InputSnapshot, RawMotionInput};
use crate::machine::MotionStateMachine;
use crate::state::{Facing, MovementState};

/// Everything a tick reads from outside the rig.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub input: RawMotionInput,
    pub contacts: ContactSignals,
    /// Velocity of the physics body at the start of the tick.
    pub body_velocity: Vec2,
    pub delta: f32,
    pub config: &'a MotionConfig,
}

/// What a successful tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Pass 1 changed the state. Nothing was integrated and the body keeps
    /// its velocity.
    Rebound {
        from: MovementState,
        to: MovementState,
    },
    /// The state's rule was integrated and `velocity` should be written to the
    /// body. `to` differs from `from` when pass 2 changed the state.
    Integrated {
        from: MovementState,
        to: MovementState,
        velocity: Vec2,
    },
}

impl TickOutcome {
    /// The velocity to write back to the body, if any.
    pub fn committed_velocity(&self) -> Option<Vec2> {
        match self {
            TickOutcome::Rebound { .. } => None,
            TickOutcome::Integrated { velocity, .. } => Some(*velocity),
        }
    }

    /// State after the tick.
    pub fn state(&self) -> MovementState {
        match self {
            TickOutcome::Rebound { to, .. } | TickOutcome::Integrated { to, .. } => *to,
        }
    }

    pub fn transitioned(&self) -> bool {
        match self {
            TickOutcome::Rebound { from, to } | TickOutcome::Integrated { from, to, .. } => {
                from != to
            }
        }
    }
}

/// Motion state of one character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// let config = MotionConfig::default();
/// let mut rig = CharacterRig::new();
/// let ctx = TickContext {
///     input: RawMotionInput { jump: true, ..default() },
///     contacts: ContactSignals::grounded(),
///     body_velocity: Vec2::ZERO,
///     delta: 1.0 / 60.0,
///     config: &config,
/// };
///
/// let outcome = rig.tick(&ctx, &mut NoAnimation).unwrap();
/// assert_eq!(outcome.state(), MovementState::JumpStart);
/// assert_eq!(outcome.committed_velocity(), None);
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct CharacterRig {
    state: MovementState,
    /// Result of the most recent transition pass.
    desired: MovementState,
    velocity: Vec2,
    facing: Facing,
    input: InputSnapshot,
    contacts: ContactSnapshot,
    channel: AnimationChannel,
    #[reflect(ignore)]
    fault: Option<MotionError>,
}

impl CharacterRig {
    /// A rig standing idle, facing right.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start in `state` instead of idle.
    ///
    /// Characters spawned in the air should start in
    /// [`MovementState::JumpingNormal`], since idle requires ground contact.
    pub fn starting_in(mut self, state: MovementState) -> Self {
        self.state = state;
        self.desired = state;
        self
    }

    /// Builder: set the initial facing.
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Run one fixed tick.
    ///
    /// Once a tick has failed, the rig is faulted and every later call returns
    /// the same error without touching any state.
    pub fn tick(
        &mut self,
        ctx: &TickContext<'_>,
        provider: &mut dyn AnimationProvider,
    ) -> Result<TickOutcome, MotionError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        let result = self.step(ctx, provider);
        if let Err(err) = &result {
            self.fault = Some(err.clone());
        }
        result
    }

    fn step(
        &mut self,
        ctx: &TickContext<'_>,
        provider: &mut dyn AnimationProvider,
    ) -> Result<TickOutcome, MotionError> {
        let machine = MotionStateMachine::new(ctx.config);

        if !self.channel.is_bound() {
            self.channel.bind(self.state, provider);
        }

        self.velocity = ctx.body_velocity;
        self.input.capture(&ctx.input, ctx.delta);
        self.contacts.capture(&ctx.contacts, ctx.delta);

        let from = self.state;

        // Pass 1
        self.desired = machine.next_state(
            from,
            self.velocity,
            &self.input,
            &self.contacts,
            self.channel.is_finished(),
        )?;
        if self.desired != from {
            self.enter(self.desired, provider);
            return Ok(TickOutcome::Rebound {
                from,
                to: self.desired,
            });
        }

        let mut velocity = self.velocity;
        let mut facing = self.facing;
        machine.integrate(
            from,
            &mut velocity,
            &mut facing,
            &self.input,
            &self.contacts,
            ctx.delta,
        )?;
        machine.apply_gravity(from, &mut velocity, &self.contacts, ctx.delta);

        // Pass 2
        let to = machine.next_state(
            from,
            velocity,
            &self.input,
            &self.contacts,
            self.channel.is_finished(),
        )?;

        self.velocity = velocity;
        self.facing = facing;
        self.desired = to;

        if to == from {
            let drive = machine.animation_drive(from, velocity);
            self.channel.advance(drive, ctx.delta, provider);
        } else {
            self.enter(to, provider);
        }

        Ok(TickOutcome::Integrated { from, to, velocity })
    }

    fn enter(&mut self, state: MovementState, provider: &mut dyn AnimationProvider) {
        self.state = state;
        self.channel.bind(state, provider);
    }

    #[inline]
    pub fn state(&self) -> MovementState {
        self.state
    }

    #[inline]
    pub fn desired_state(&self) -> MovementState {
        self.desired
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    pub fn contacts(&self) -> &ContactSnapshot {
        &self.contacts
    }

    pub fn channel(&self) -> &AnimationChannel {
        &self.channel
    }

    /// The error that stopped this rig, if any.
    pub fn fault(&self) -> Option<&MotionError> {
        self.fault.as_ref()
    }

    #[inline]
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Read-only snapshot of the rig for inspection.
    pub fn diagnostics(&self) -> MotionDiagnostics {
        let jump = self.input.jump();
        MotionDiagnostics {
            contacts: self.contacts.touching_all(),
            input: self.input.held(),
            jump_capture_time: jump.last_capture_duration(),
            jump_held_time: jump.accumulator(),
            state: self.state,
            desired_state: self.desired,
            velocity: self.velocity,
            facing: self.facing,
            phase: self.channel.phase(),
            halted: self.is_faulted(),
        }
    }
}
