//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.
//!
//! Velocity is mirrored through [`Velocity::linvel`]. Contacts come from
//! four short shapecasts per character, one toward each [`ContactDirection`],
//! written into the character's [`ContactSignals`] during
//! [`MotionControllerSet::Sensors`].

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::MotionBackend;
use crate::config::ContactProbeConfig;
use crate::contact::{ContactDirection, ContactSignals};
use crate::MotionControllerSet;

/// Rapier2D physics backend for the motion controller.
pub struct Rapier2dBackend;

impl MotionBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }
}

/// Plugin that sets up Rapier2D-specific systems for the motion controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_contact_detection.in_set(MotionControllerSet::Sensors),
        );
    }
}

/// Per-direction collision filters for the contact probes.
///
/// Directions left unset use the character's own [`CollisionGroups`], or no
/// filter at all when it has none.
///
/// ```rust
/// use bevy_rapier2d::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// let terrain = CollisionGroups::new(Group::GROUP_1, Group::GROUP_2);
/// let layers = ContactLayers::default().with(ContactDirection::Ground, terrain);
/// assert_eq!(layers.get(ContactDirection::Ground), Some(terrain));
/// assert_eq!(layers.get(ContactDirection::Left), None);
/// ```
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactLayers {
    pub left: Option<CollisionGroups>,
    pub right: Option<CollisionGroups>,
    pub ceiling: Option<CollisionGroups>,
    pub ground: Option<CollisionGroups>,
}

impl ContactLayers {
    /// The same filter in every direction.
    pub fn uniform(groups: CollisionGroups) -> Self {
        Self {
            left: Some(groups),
            right: Some(groups),
            ceiling: Some(groups),
            ground: Some(groups),
        }
    }

    /// Builder: set the filter for one direction.
    pub fn with(mut self, direction: ContactDirection, groups: CollisionGroups) -> Self {
        *self.slot(direction) = Some(groups);
        self
    }

    pub fn get(&self, direction: ContactDirection) -> Option<CollisionGroups> {
        match direction {
            ContactDirection::Left => self.left,
            ContactDirection::Right => self.right,
            ContactDirection::Ceiling => self.ceiling,
            ContactDirection::Ground => self.ground,
        }
    }

    fn slot(&mut self, direction: ContactDirection) -> &mut Option<CollisionGroups> {
        match direction {
            ContactDirection::Left => &mut self.left,
            ContactDirection::Right => &mut self.right,
            ContactDirection::Ceiling => &mut self.ceiling,
            ContactDirection::Ground => &mut self.ground,
        }
    }
}

/// Half width and half height of a collider's bounds around its center.
pub fn collider_half_extents(collider: &Collider) -> Vec2 {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let radius = capsule.radius();
        let half_x = (segment.a().x - segment.b().x).abs() / 2.0;
        let half_y = (segment.a().y - segment.b().y).abs() / 2.0;
        Vec2::new(half_x + radius, half_y + radius)
    } else if let Some(ball) = collider.as_ball() {
        Vec2::splat(ball.radius())
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents()
    } else {
        // Unknown shape: probes start at the surface of a point
        Vec2::ZERO
    }
}

/// Probe length and segment size for one direction.
fn probe_shape(direction: ContactDirection, half_extents: Vec2, probe: &ContactProbeConfig) -> (f32, f32, f32) {
    match direction {
        ContactDirection::Left | ContactDirection::Right => {
            (half_extents.x + probe.skin, 0.0, probe.wall_cast_height)
        }
        ContactDirection::Ceiling => (half_extents.y + probe.skin, probe.ceiling_cast_width, 0.0),
        ContactDirection::Ground => (half_extents.y + probe.skin, probe.ground_cast_width, 0.0),
    }
}

/// Segment swept by a probe: vertical for walls, horizontal for ground and ceiling.
fn probe_segment(width: f32, height: f32) -> Collider {
    if height > width {
        let half_height = height / 2.0;
        Collider::segment(Vec2::new(0.0, -half_height), Vec2::new(0.0, half_height))
    } else {
        let half_width = width / 2.0;
        Collider::segment(Vec2::new(-half_width, 0.0), Vec2::new(half_width, 0.0))
    }
}

/// Perform a shapecast using RapierContext.
///
/// Returns the distance to the first hit.
fn rapier_shapecast(
    context: &RapierContext,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    shape_width: f32,
    shape_height: f32,
    exclude_entity: Entity,
    collision_groups: Option<CollisionGroups>,
) -> Option<f32> {
    let shape = probe_segment(shape_width, shape_height);

    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_collider(exclude_entity)
        .exclude_sensors();

    if let Some(groups) = collision_groups {
        filter = filter.groups(groups);
    }

    context
        .cast_shape(
            origin,
            0.0,
            direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .map(|(_, hit)| hit.time_of_impact)
}

/// Rapier-specific contact detection using one shapecast per direction.
///
/// A direction counts as touching when something is hit within the
/// collider's half extent plus the probe skin.
fn rapier_contact_detection(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<(
        Entity,
        &GlobalTransform,
        &mut ContactSignals,
        Option<&ContactProbeConfig>,
        Option<&ContactLayers>,
        Option<&CollisionGroups>,
        Option<&Collider>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, mut signals, probe, layers, own_groups, collider) in &mut q_characters {
        let position = transform.translation().xy();
        let probe = probe.copied().unwrap_or_default();
        let half_extents = collider.map(collider_half_extents).unwrap_or(Vec2::ZERO);

        let mut next = ContactSignals::airborne();
        for direction in ContactDirection::ALL {
            let groups = layers
                .and_then(|l| l.get(direction))
                .or_else(|| own_groups.copied());
            let (reach, width, height) = probe_shape(direction, half_extents, &probe);

            let hit = rapier_shapecast(
                &context,
                position,
                direction.direction(),
                reach,
                width,
                height,
                entity,
                groups,
            );
            next.set(direction, hit.is_some());
        }

        if *signals != next {
            *signals = next;
        }
    }
}

/// Bundle for creating a character with Rapier2D physics.
///
/// The controller owns horizontal velocity, so damping defaults to zero and
/// rotation is locked. Rapier's gravity stays on: with the default
/// [`GravityModel::TerminalClamp`](crate::config::GravityModel::TerminalClamp)
/// the engine pulls the character down and the controller only caps the fall
/// speed. Use [`without_engine_gravity`](Self::without_engine_gravity) with
/// [`GravityModel::Accelerated`](crate::config::GravityModel::Accelerated).
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use motion_state_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 100.0, 0.0),
///         CharacterRig::new().starting_in(MovementState::JumpingNormal),
///         MotionConfig::pixels(32.0),
///         RawMotionInput::default(),
///         MotionKeyBindings::default(),
///         Rapier2dMotionBundle::new(),
///         Collider::capsule_y(8.0, 4.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dMotionBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`] for characters.
    pub rigid_body: RigidBody,
    /// Linear velocity, mirrored by the controller every tick.
    pub velocity: Velocity,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
    /// Scale of Rapier's gravity for this body.
    pub gravity_scale: GravityScale,
    /// Written by the contact probes.
    pub contacts: ContactSignals,
    /// Sizes of the contact probes.
    pub probe: ContactProbeConfig,
}

impl Default for Rapier2dMotionBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dMotionBundle {
    /// A dynamic, rotation-locked, undamped body under engine gravity.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            gravity_scale: GravityScale(1.0),
            contacts: ContactSignals::default(),
            probe: ContactProbeConfig::default(),
        }
    }

    /// Builder: turn off Rapier's gravity for this body.
    pub fn without_engine_gravity(mut self) -> Self {
        self.gravity_scale = GravityScale(0.0);
        self
    }

    /// Builder: set the rigid body type.
    ///
    /// ```ignore
    /// // A kinematic character for scripted movement
    /// let bundle = Rapier2dMotionBundle::new()
    ///     .with_body(RigidBody::KinematicVelocityBased);
    /// ```
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Builder: set the contact probe sizes.
    pub fn with_probe(mut self, probe: ContactProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Builder: set the damping coefficients.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}
