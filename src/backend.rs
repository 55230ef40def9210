//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the motion controller. The controller only needs to mirror
//! one velocity per character and to know which of the four sides touch
//! something, so a backend can be a full physics engine (Rapier2D) or a
//! plain component the game updates itself ([`ManualBackend`]).

use bevy::prelude::*;

use crate::contact::ContactSignals;

/// Trait for physics backend implementations.
///
/// # Example
///
/// For an engine-backed implementation, see the `rapier` module's
/// `Rapier2dBackend`. A backend that keeps velocity in its own component
/// looks like this:
///
/// ```rust
/// use bevy::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// #[derive(Component, Default)]
/// struct MyBody(Vec2);
///
/// struct MyBackend;
///
/// impl MotionBackend for MyBackend {
///     fn plugin() -> impl Plugin {
///         NoOpBackendPlugin
///     }
///
///     fn get_velocity(world: &World, entity: Entity) -> Vec2 {
///         world.get::<MyBody>(entity).map(|b| b.0).unwrap_or(Vec2::ZERO)
///     }
///
///     fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
///         if let Some(mut body) = world.get_mut::<MyBody>(entity) {
///             body.0 = velocity;
///         }
///     }
/// }
/// ```
pub trait MotionBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    ///
    /// Contact detection systems belong in
    /// [`MotionControllerSet::Sensors`](crate::MotionControllerSet::Sensors).
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Contacts of an entity for the current tick.
    ///
    /// The default reads the entity's [`ContactSignals`] component, which
    /// contact-detection systems (or the game) keep up to date.
    fn get_contacts(world: &World, entity: Entity) -> ContactSignals {
        world
            .get::<ContactSignals>(entity)
            .copied()
            .unwrap_or_default()
    }

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Velocity of a character moved by the game's own physics.
///
/// Used by [`ManualBackend`]: the controller reads it at the start of a tick
/// and writes the committed velocity back at the end.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct BodyVelocity(pub Vec2);

/// Backend for games that run their own physics (or none).
///
/// Velocity lives in [`BodyVelocity`]; contacts are whatever the game writes
/// into [`ContactSignals`] before the motion systems run.
pub struct ManualBackend;

impl MotionBackend for ManualBackend {
    fn plugin() -> impl Plugin {
        ManualBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<BodyVelocity>(entity)
            .map(|v| v.0)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut body) = world.get_mut::<BodyVelocity>(entity) {
            body.0 = velocity;
        }
    }
}

/// Registers [`BodyVelocity`] for reflection.
pub struct ManualBackendPlugin;

impl Plugin for ManualBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BodyVelocity>();
    }
}
