//! Four-directional contact state.
//!
//! Contact resolution itself belongs to the physics backend: each tick it
//! reports whether the character touches something on its left, right,
//! ceiling and ground sides. The rig captures those booleans into a
//! [`ContactSnapshot`] so rising edges and contact durations are available.

use bevy::prelude::*;

use crate::detector::EdgeInputDetector;

/// A fixed physical side of the character.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactDirection {
    Left,
    Right,
    Ceiling,
    Ground,
}

impl ContactDirection {
    pub const ALL: [ContactDirection; 4] = [
        ContactDirection::Left,
        ContactDirection::Right,
        ContactDirection::Ceiling,
        ContactDirection::Ground,
    ];

    /// Unit vector pointing from the character toward this side.
    pub fn direction(self) -> Vec2 {
        match self {
            ContactDirection::Left => Vec2::NEG_X,
            ContactDirection::Right => Vec2::X,
            ContactDirection::Ceiling => Vec2::Y,
            ContactDirection::Ground => Vec2::NEG_Y,
        }
    }
}

/// Raw contact booleans for the current tick.
///
/// Written by the physics backend (or by the game when using
/// [`ManualBackend`](crate::backend::ManualBackend)).
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct ContactSignals {
    pub left: bool,
    pub right: bool,
    pub ceiling: bool,
    pub ground: bool,
}

impl ContactSignals {
    /// No contact on any side.
    pub fn airborne() -> Self {
        Self::default()
    }

    /// Ground contact only.
    pub fn grounded() -> Self {
        Self {
            ground: true,
            ..default()
        }
    }

    pub fn get(&self, direction: ContactDirection) -> bool {
        match direction {
            ContactDirection::Left => self.left,
            ContactDirection::Right => self.right,
            ContactDirection::Ceiling => self.ceiling,
            ContactDirection::Ground => self.ground,
        }
    }

    pub fn set(&mut self, direction: ContactDirection, touching: bool) {
        match direction {
            ContactDirection::Left => self.left = touching,
            ContactDirection::Right => self.right = touching,
            ContactDirection::Ceiling => self.ceiling = touching,
            ContactDirection::Ground => self.ground = touching,
        }
    }
}

/// Edge-tracked contacts for one character, recaptured once per tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactSnapshot {
    left: EdgeInputDetector,
    right: EdgeInputDetector,
    ceiling: EdgeInputDetector,
    ground: EdgeInputDetector,
}

impl ContactSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn capture(&mut self, raw: &ContactSignals, delta: f32) {
        self.left.set(raw.left, delta);
        self.right.set(raw.right, delta);
        self.ceiling.set(raw.ceiling, delta);
        self.ground.set(raw.ground, delta);
    }

    pub fn detector(&self, direction: ContactDirection) -> &EdgeInputDetector {
        match direction {
            ContactDirection::Left => &self.left,
            ContactDirection::Right => &self.right,
            ContactDirection::Ceiling => &self.ceiling,
            ContactDirection::Ground => &self.ground,
        }
    }

    /// Whether the character touches ground this tick.
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.ground.is_active()
    }

    #[inline]
    pub fn touching(&self, direction: ContactDirection) -> bool {
        self.detector(direction).is_active()
    }

    /// True on the tick ground contact was made.
    pub fn just_landed(&self) -> bool {
        self.ground.just_activated()
    }

    /// The current contacts, as raw signals.
    pub fn touching_all(&self) -> ContactSignals {
        ContactSignals {
            left: self.left.is_active(),
            right: self.right.is_active(),
            ceiling: self.ceiling.is_active(),
            ground: self.ground.is_active(),
        }
    }
}
