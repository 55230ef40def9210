//! Motion tuning components.
//!
//! This module defines the tuning for the motion state machine (run and jump
//! rates, velocity caps, the gravity model) and the contact probe sizes used
//! by physics backends that detect contacts by casting.

use bevy::prelude::*;

use crate::error::MotionError;

/// How gravity is applied to the integrated velocity.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum GravityModel {
    /// Gravity comes from the physics engine; the controller only caps the
    /// fall speed at `max_fall_velocity`.
    #[default]
    TerminalClamp,
    /// The controller subtracts `gravity * dt` from the vertical velocity while
    /// airborne, then caps the fall speed.
    Accelerated { gravity: f32 },
}

/// Tuning for the motion state machine.
///
/// Accelerations are given in user-facing units and multiplied by
/// `acceleration_frame_scale` and the tick delta to obtain per-tick velocity
/// changes. Velocities are in world units per second.
///
/// # Example
///
/// ```rust
/// use motion_state_controller::prelude::*;
///
/// let config = MotionConfig::default()
///     .with_max_run_velocity(4.0)
///     .with_jump_velocity(6.0);
/// assert!((config.run_start_velocity() - 0.4).abs() < 1e-6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MotionConfig {
    // === Run Settings ===
    /// Acceleration toward the held direction.
    pub run_acceleration: f32,

    /// Deceleration while the opposite direction is held.
    pub run_deceleration: f32,

    /// Deceleration while no direction is held.
    pub run_auto_deceleration: f32,

    /// Horizontal speed cap on the ground.
    pub max_run_velocity: f32,

    /// Fraction of `max_run_velocity` separating the run start/end states
    /// from steady running. In `(0, 1]`.
    pub run_start_ratio: f32,

    // === Vertical Settings ===
    /// Vertical velocity set by the jump impulse.
    pub max_jump_velocity: f32,

    /// Terminal fall speed (positive; applied downward).
    pub max_fall_velocity: f32,

    /// Gravity handling.
    pub gravity: GravityModel,

    // === Scaling ===
    /// Converts user-facing accelerations into per-tick velocity deltas.
    pub acceleration_frame_scale: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            run_acceleration: 1.0,
            run_deceleration: 1.0,
            run_auto_deceleration: 1.0,
            max_run_velocity: 1.0,
            run_start_ratio: 0.1,

            max_jump_velocity: 1.0,
            max_fall_velocity: 1.0,
            gravity: GravityModel::TerminalClamp,

            acceleration_frame_scale: 100.0,
        }
    }
}

impl MotionConfig {
    /// Speed separating run start/end from steady running.
    #[inline]
    pub fn run_start_velocity(&self) -> f32 {
        self.max_run_velocity * self.run_start_ratio
    }

    /// Velocity change from `acceleration` over one tick of `dt` seconds.
    #[inline]
    pub fn step(&self, acceleration: f32, dt: f32) -> f32 {
        acceleration * self.acceleration_frame_scale * dt
    }

    /// A config for worlds measured in pixels (sprite-scale velocities).
    pub fn pixels(pixels_per_unit: f32) -> Self {
        let base = Self::default();
        Self {
            max_run_velocity: base.max_run_velocity * pixels_per_unit,
            max_jump_velocity: base.max_jump_velocity * pixels_per_unit,
            max_fall_velocity: base.max_fall_velocity * pixels_per_unit,
            acceleration_frame_scale: base.acceleration_frame_scale * pixels_per_unit,
            ..base
        }
    }

    /// Builder: set all three run rates.
    pub fn with_run(mut self, acceleration: f32, deceleration: f32, auto_deceleration: f32) -> Self {
        self.run_acceleration = acceleration;
        self.run_deceleration = deceleration;
        self.run_auto_deceleration = auto_deceleration;
        self
    }

    /// Builder: set the run speed cap.
    pub fn with_max_run_velocity(mut self, velocity: f32) -> Self {
        self.max_run_velocity = velocity;
        self
    }

    /// Builder: set the run start ratio.
    pub fn with_run_start_ratio(mut self, ratio: f32) -> Self {
        self.run_start_ratio = ratio;
        self
    }

    /// Builder: set the jump impulse velocity.
    pub fn with_jump_velocity(mut self, velocity: f32) -> Self {
        self.max_jump_velocity = velocity;
        self
    }

    /// Builder: set the terminal fall speed.
    pub fn with_fall_velocity(mut self, velocity: f32) -> Self {
        self.max_fall_velocity = velocity;
        self
    }

    /// Builder: set the gravity model.
    pub fn with_gravity(mut self, gravity: GravityModel) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set the acceleration frame scale.
    pub fn with_frame_scale(mut self, scale: f32) -> Self {
        self.acceleration_frame_scale = scale;
        self
    }

    /// Check that every value is usable by the state machine.
    pub fn validate(&self) -> Result<(), MotionError> {
        fn positive(field: &'static str, value: f32) -> Result<(), MotionError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(MotionError::InvalidConfig { field, value })
            }
        }

        fn non_negative(field: &'static str, value: f32) -> Result<(), MotionError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(MotionError::InvalidConfig { field, value })
            }
        }

        non_negative("run_acceleration", self.run_acceleration)?;
        non_negative("run_deceleration", self.run_deceleration)?;
        non_negative("run_auto_deceleration", self.run_auto_deceleration)?;
        positive("max_run_velocity", self.max_run_velocity)?;
        positive("max_jump_velocity", self.max_jump_velocity)?;
        positive("max_fall_velocity", self.max_fall_velocity)?;
        positive("acceleration_frame_scale", self.acceleration_frame_scale)?;

        if !(self.run_start_ratio > 0.0 && self.run_start_ratio <= 1.0) {
            return Err(MotionError::InvalidConfig {
                field: "run_start_ratio",
                value: self.run_start_ratio,
            });
        }

        if let GravityModel::Accelerated { gravity } = self.gravity {
            non_negative("gravity", gravity)?;
        }

        Ok(())
    }
}

/// Sizes of the four contact probes cast by physics backends.
///
/// Probes start at the character's center and extend past the collider's
/// half extent by `skin`; a hit within that reach counts as touching.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ContactProbeConfig {
    /// Distance past the collider surface that still counts as contact.
    pub skin: f32,

    /// Width of the ground shapecast.
    pub ground_cast_width: f32,

    /// Width of the ceiling shapecast.
    pub ceiling_cast_width: f32,

    /// Height of the left/right wall shapecasts.
    pub wall_cast_height: f32,
}

impl Default for ContactProbeConfig {
    fn default() -> Self {
        Self {
            skin: 1.0,
            ground_cast_width: 6.0,
            ceiling_cast_width: 6.0,
            wall_cast_height: 4.0,
        }
    }
}

impl ContactProbeConfig {
    /// Builder: set the skin distance.
    pub fn with_skin(mut self, skin: f32) -> Self {
        self.skin = skin;
        self
    }

    /// Builder: set the ground and ceiling cast widths.
    pub fn with_cast_width(mut self, width: f32) -> Self {
        self.ground_cast_width = width;
        self.ceiling_cast_width = width;
        self
    }

    /// Builder: set the wall cast height.
    pub fn with_wall_cast_height(mut self, height: f32) -> Self {
        self.wall_cast_height = height;
        self
    }
}
