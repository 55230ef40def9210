//! The motion state machine.
//!
//! [`MotionStateMachine`] holds no state of its own. It answers three
//! questions for a character each tick:
//!
//! 1. Which state should it be in, given its current state, velocity, input
//!    and contacts? ([`next_state`](MotionStateMachine::next_state))
//! 2. How does the current state change the velocity?
//!    ([`integrate`](MotionStateMachine::integrate) and
//!    [`apply_gravity`](MotionStateMachine::apply_gravity))
//! 3. How should the state's animation advance?
//!    ([`animation_drive`](MotionStateMachine::animation_drive))
//!
//! The ordering of these calls within a tick is owned by
//! [`CharacterRig`](crate::rig::CharacterRig).

use bevy::prelude::*;

use crate::animation::AnimationDrive;
use crate::config::{GravityModel, MotionConfig};
use crate::contact::ContactSnapshot;
use crate::error::MotionError;
use crate::input::InputSnapshot;
use crate::state::{Facing, MovementState};

/// Transition table and per-state integration rules over a [`MotionConfig`].
#[derive(Debug, Clone, Copy)]
pub struct MotionStateMachine<'a> {
    config: &'a MotionConfig,
}

impl<'a> MotionStateMachine<'a> {
    pub fn new(config: &'a MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        self.config
    }

    /// Compute the state the character should be in.
    ///
    /// Pure: depends only on the arguments and the config. Returns
    /// [`MotionError::PreconditionViolated`] when a ground-bound state is
    /// evaluated without ground contact.
    pub fn next_state(
        &self,
        current: MovementState,
        velocity: Vec2,
        input: &InputSnapshot,
        contact: &ContactSnapshot,
        animation_finished: bool,
    ) -> Result<MovementState, MotionError> {
        use MovementState::*;

        let grounded = contact.on_ground();
        let run_start = self.config.run_start_velocity();
        let speed = velocity.x.abs();

        if current.requires_ground() {
            require_ground(current, contact)?;
        }

        let next = match current {
            Idle => {
                if input.horizontal_held() {
                    GroundMoveStart
                } else if input.jump().just_activated() {
                    JumpStart
                } else if input.down().is_active() {
                    MorphStart
                } else {
                    Idle
                }
            }
            GroundMove => {
                if input.jump().just_activated() {
                    JumpStart
                } else if input.down().is_active() {
                    MorphStart
                } else if speed <= run_start {
                    GroundMoveEnd
                } else {
                    GroundMove
                }
            }
            GroundMoveStart | GroundMoveEnd => {
                if speed >= run_start {
                    GroundMove
                } else if velocity.x == 0.0 && !input.horizontal_held() {
                    Idle
                } else {
                    current
                }
            }
            GroundMoveLeftToRight | GroundMoveRightToLeft => GroundMove,
            JumpStart => {
                // Hold until the launch impulse has been integrated.
                if velocity.y < self.config.max_jump_velocity {
                    JumpStart
                } else if input.horizontal_held() {
                    JumpingSpin
                } else {
                    JumpingNormal
                }
            }
            JumpingNormal | JumpingSpin => {
                // Ground contact while still rising is the launch, not a landing.
                if landed(velocity, contact) {
                    JumpEnd
                } else {
                    current
                }
            }
            JumpEnd => {
                if grounded {
                    GroundMove
                } else {
                    JumpEnd
                }
            }
            MorphStart => {
                if animation_finished {
                    Morphed
                } else {
                    MorphStart
                }
            }
            Morphed => {
                if input.up().is_active() {
                    MorphEnd
                } else {
                    Morphed
                }
            }
            MorphEnd => {
                if !animation_finished {
                    MorphEnd
                } else if grounded {
                    GroundMove
                } else {
                    JumpingNormal
                }
            }
        };

        Ok(next)
    }

    /// Apply the current state's velocity rule in place.
    ///
    /// `facing` may flip while running on the ground.
    pub fn integrate(
        &self,
        state: MovementState,
        velocity: &mut Vec2,
        facing: &mut Facing,
        input: &InputSnapshot,
        contact: &ContactSnapshot,
        dt: f32,
    ) -> Result<(), MotionError> {
        use MovementState::*;

        match state {
            Idle => velocity.x = 0.0,
            GroundMoveStart
            | GroundMove
            | GroundMoveEnd
            | GroundMoveLeftToRight
            | GroundMoveRightToLeft => {
                require_ground(state, contact)?;
                self.run_on_ground(velocity, facing, input, dt);
            }
            JumpStart => velocity.y = self.config.max_jump_velocity,
            JumpingNormal | JumpingSpin => {
                if landed(*velocity, contact) {
                    return Err(MotionError::requires_air(state));
                }
                self.steer_in_air(velocity, *facing, input, dt);
            }
            JumpEnd => {}
            MorphStart | Morphed | MorphEnd => {
                if contact.on_ground() {
                    self.run_on_ground(velocity, facing, input, dt);
                }
            }
        }

        Ok(())
    }

    /// Apply the configured gravity model, ending with the terminal-velocity clamp.
    ///
    /// Accelerated gravity skips [`MovementState::JumpStart`]: its launch
    /// impulse is checked by the same tick's second transition pass.
    pub fn apply_gravity(
        &self,
        state: MovementState,
        velocity: &mut Vec2,
        contact: &ContactSnapshot,
        dt: f32,
    ) {
        if let GravityModel::Accelerated { gravity } = self.config.gravity {
            if state != MovementState::JumpStart && !contact.on_ground() {
                velocity.y -= gravity * dt;
            }
        }
        velocity.y = velocity.y.max(-self.config.max_fall_velocity);
    }

    /// How the state's animation advances this tick.
    ///
    /// Scaled states follow a physical quantity; the rest play on elapsed time.
    pub fn animation_drive(&self, state: MovementState, velocity: Vec2) -> AnimationDrive {
        use MovementState::*;

        match state {
            GroundMoveStart | GroundMove | GroundMoveEnd | Morphed => {
                AnimationDrive::Scrub(self.run_phase(velocity.x))
            }
            JumpingNormal => AnimationDrive::Scrub(self.jump_phase(velocity.y)),
            Idle | JumpStart | JumpingSpin | JumpEnd | GroundMoveLeftToRight
            | GroundMoveRightToLeft | MorphStart | MorphEnd => AnimationDrive::Elapse,
        }
    }

    /// Run cycle phase from horizontal speed.
    pub fn run_phase(&self, vx: f32) -> f32 {
        (vx.abs() / self.config.max_run_velocity).clamp(0.0, 1.0)
    }

    /// Jump arc phase from vertical velocity.
    ///
    /// 0 at full launch speed, 0.5 at the apex, 1 at terminal fall speed.
    /// Falling continues past the apex toward 1 instead of mirroring back
    /// toward 0, so the phase only grows over a whole jump and a single
    /// rise-then-fall sheet plays through once.
    pub fn jump_phase(&self, vy: f32) -> f32 {
        let phase = if vy > 0.0 {
            0.5 - vy / self.config.max_jump_velocity / 2.0
        } else {
            0.5 - vy / self.config.max_fall_velocity / 2.0
        };
        phase.clamp(0.0, 1.0)
    }

    fn run_on_ground(&self, velocity: &mut Vec2, facing: &mut Facing, input: &InputSnapshot, dt: f32) {
        let (mut forward, mut backward) = held_along(*facing, input);
        let mut speed = velocity.x * facing.sign();

        // Turn around when sliding backward, or at rest with only the opposite direction held.
        if speed < 0.0 || (speed == 0.0 && backward && !forward) {
            *facing = facing.flipped();
            speed = -speed;
            std::mem::swap(&mut forward, &mut backward);
        }

        let config = self.config;
        speed = if backward {
            (speed - config.step(config.run_deceleration, dt)).max(0.0)
        } else if forward {
            speed + config.step(config.run_acceleration, dt)
        } else {
            (speed - config.step(config.run_auto_deceleration, dt)).max(0.0)
        };

        // Cap at the run speed and never cross to the far side of the facing.
        speed = speed.clamp(0.0, config.max_run_velocity);
        velocity.x = speed * facing.sign();
    }

    fn steer_in_air(&self, velocity: &mut Vec2, facing: Facing, input: &InputSnapshot, dt: f32) {
        let (forward, backward) = held_along(facing, input);
        let config = self.config;

        if forward {
            velocity.x += facing.sign() * config.step(config.run_acceleration, dt);
        } else if backward {
            velocity.x -= facing.sign() * config.step(config.run_deceleration, dt);
        }
    }
}

/// Touching ground without moving up.
fn landed(velocity: Vec2, contact: &ContactSnapshot) -> bool {
    contact.on_ground() && velocity.y <= 0.0
}

fn require_ground(state: MovementState, contact: &ContactSnapshot) -> Result<(), MotionError> {
    if contact.on_ground() {
        Ok(())
    } else {
        Err(MotionError::requires_ground(state))
    }
}

/// (forward, backward) held relative to the facing.
fn held_along(facing: Facing, input: &InputSnapshot) -> (bool, bool) {
    let left = input.left().is_active();
    let right = input.right().is_active();
    match facing {
        Facing::Right => (right, left),
        Facing::Left => (left, right),
    }
}
