//! Movement states and their animation bindings.
//!
//! Exactly one [`MovementState`] is active per character. Each state is bound
//! to one animation and one visual out of five [`AnimationIdentity`] slots;
//! several states share a slot.

use bevy::prelude::*;

/// The closed set of movement states.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MovementState {
    #[default]
    Idle,
    GroundMoveStart,
    GroundMove,
    GroundMoveEnd,
    GroundMoveLeftToRight,
    GroundMoveRightToLeft,
    JumpStart,
    JumpingNormal,
    JumpingSpin,
    JumpEnd,
    MorphStart,
    Morphed,
    MorphEnd,
}

impl MovementState {
    pub const ALL: [MovementState; 13] = [
        MovementState::Idle,
        MovementState::GroundMoveStart,
        MovementState::GroundMove,
        MovementState::GroundMoveEnd,
        MovementState::GroundMoveLeftToRight,
        MovementState::GroundMoveRightToLeft,
        MovementState::JumpStart,
        MovementState::JumpingNormal,
        MovementState::JumpingSpin,
        MovementState::JumpEnd,
        MovementState::MorphStart,
        MovementState::Morphed,
        MovementState::MorphEnd,
    ];

    /// Animation slot driven while this state is active.
    pub const fn animation(self) -> AnimationIdentity {
        match self {
            MovementState::Idle => AnimationIdentity::Idle,
            MovementState::GroundMoveStart
            | MovementState::GroundMove
            | MovementState::GroundMoveEnd
            | MovementState::GroundMoveLeftToRight
            | MovementState::GroundMoveRightToLeft => AnimationIdentity::Running,
            MovementState::JumpStart | MovementState::JumpingNormal | MovementState::JumpEnd => {
                AnimationIdentity::JumpNormal
            }
            MovementState::JumpingSpin => AnimationIdentity::JumpSpin,
            // Morph transitions play on the idle rig; only the steady state has its own sheet.
            MovementState::MorphStart | MovementState::MorphEnd => AnimationIdentity::Idle,
            MovementState::Morphed => AnimationIdentity::Morph,
        }
    }

    /// Visual slot shown while this state is active.
    ///
    /// Every animation slot has exactly one visual, so this follows
    /// [`animation`](Self::animation).
    pub const fn visual(self) -> AnimationIdentity {
        self.animation()
    }

    /// States whose ground-contact precondition is checked by the transition table.
    pub const fn requires_ground(self) -> bool {
        matches!(
            self,
            MovementState::Idle
                | MovementState::GroundMoveStart
                | MovementState::GroundMove
                | MovementState::GroundMoveEnd
                | MovementState::GroundMoveLeftToRight
                | MovementState::GroundMoveRightToLeft
        )
    }
}

/// One of the five animation/visual slots of a character.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnimationIdentity {
    #[default]
    Idle,
    Running,
    JumpNormal,
    JumpSpin,
    Morph,
}

impl AnimationIdentity {
    pub const ALL: [AnimationIdentity; 5] = [
        AnimationIdentity::Idle,
        AnimationIdentity::Running,
        AnimationIdentity::JumpNormal,
        AnimationIdentity::JumpSpin,
        AnimationIdentity::Morph,
    ];
}

/// Horizontal facing. Sprites are authored facing right.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1 when facing right, -1 when facing left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    #[inline]
    pub fn is_left(self) -> bool {
        self == Facing::Left
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}
