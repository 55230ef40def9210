//! Directional and jump input.
//!
//! The game writes raw booleans into [`RawMotionInput`] from any source
//! (keyboard, gamepad, AI, network). The character rig captures them once per
//! tick into an [`InputSnapshot`], which adds edge and duration tracking.

use bevy::prelude::*;

use crate::detector::EdgeInputDetector;

/// One of the five input signals a character reads.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSignal {
    Jump,
    Up,
    Down,
    Left,
    Right,
}

impl InputSignal {
    /// All signals, in capture order.
    pub const ALL: [InputSignal; 5] = [
        InputSignal::Jump,
        InputSignal::Up,
        InputSignal::Down,
        InputSignal::Left,
        InputSignal::Right,
    ];
}

/// Raw per-tick input for a character.
///
/// No debouncing happens here: set each field to whether the control is held
/// right now and the rig's detectors take care of edges.
///
/// # Example
///
/// ```rust
/// use motion_state_controller::prelude::*;
///
/// let mut input = RawMotionInput::default();
/// input.set(InputSignal::Right, true);
/// assert!(input.right);
/// assert!(input.horizontal_held());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct RawMotionInput {
    pub jump: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl RawMotionInput {
    /// Create input with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single signal.
    pub fn get(&self, signal: InputSignal) -> bool {
        match signal {
            InputSignal::Jump => self.jump,
            InputSignal::Up => self.up,
            InputSignal::Down => self.down,
            InputSignal::Left => self.left,
            InputSignal::Right => self.right,
        }
    }

    /// Write a single signal.
    pub fn set(&mut self, signal: InputSignal, held: bool) {
        match signal {
            InputSignal::Jump => self.jump = held,
            InputSignal::Up => self.up = held,
            InputSignal::Down => self.down = held,
            InputSignal::Left => self.left = held,
            InputSignal::Right => self.right = held,
        }
    }

    /// Release everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether either horizontal direction is held.
    pub fn horizontal_held(&self) -> bool {
        self.left || self.right
    }
}

/// Edge-tracked input for one character, recaptured once per tick.
///
/// Capturing is crate-private: only the rig's tick advances the detectors, so
/// accumulators cannot be double-advanced within a tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    jump: EdgeInputDetector,
    up: EdgeInputDetector,
    down: EdgeInputDetector,
    left: EdgeInputDetector,
    right: EdgeInputDetector,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn capture(&mut self, raw: &RawMotionInput, delta: f32) {
        self.jump.set(raw.jump, delta);
        self.up.set(raw.up, delta);
        self.down.set(raw.down, delta);
        self.left.set(raw.left, delta);
        self.right.set(raw.right, delta);
    }

    /// Detector for the given signal.
    pub fn detector(&self, signal: InputSignal) -> &EdgeInputDetector {
        match signal {
            InputSignal::Jump => &self.jump,
            InputSignal::Up => &self.up,
            InputSignal::Down => &self.down,
            InputSignal::Left => &self.left,
            InputSignal::Right => &self.right,
        }
    }

    #[inline]
    pub fn jump(&self) -> &EdgeInputDetector {
        &self.jump
    }

    #[inline]
    pub fn up(&self) -> &EdgeInputDetector {
        &self.up
    }

    #[inline]
    pub fn down(&self) -> &EdgeInputDetector {
        &self.down
    }

    #[inline]
    pub fn left(&self) -> &EdgeInputDetector {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &EdgeInputDetector {
        &self.right
    }

    /// Whether either horizontal direction is held.
    pub fn horizontal_held(&self) -> bool {
        self.left.is_active() || self.right.is_active()
    }

    /// The currently held signals, as raw input.
    pub fn held(&self) -> RawMotionInput {
        RawMotionInput {
            jump: self.jump.is_active(),
            up: self.up.is_active(),
            down: self.down.is_active(),
            left: self.left.is_active(),
            right: self.right.is_active(),
        }
    }
}

/// Keyboard mapping for a character.
///
/// When present alongside [`RawMotionInput`], the input system overwrites the
/// raw input from `ButtonInput<KeyCode>` every fixed tick. Defaults to `F` for
/// jump and the arrow keys for directions.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct MotionKeyBindings {
    pub jump: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for MotionKeyBindings {
    fn default() -> Self {
        Self {
            jump: KeyCode::KeyF,
            up: KeyCode::ArrowUp,
            down: KeyCode::ArrowDown,
            left: KeyCode::ArrowLeft,
            right: KeyCode::ArrowRight,
        }
    }
}

impl MotionKeyBindings {
    /// WASD directions with space to jump.
    pub fn wasd() -> Self {
        Self {
            jump: KeyCode::Space,
            up: KeyCode::KeyW,
            down: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
        }
    }

    /// Builder: set the jump key.
    pub fn with_jump(mut self, key: KeyCode) -> Self {
        self.jump = key;
        self
    }

    /// Key bound to the given signal.
    pub fn key(&self, signal: InputSignal) -> KeyCode {
        match signal {
            InputSignal::Jump => self.jump,
            InputSignal::Up => self.up,
            InputSignal::Down => self.down,
            InputSignal::Left => self.left,
            InputSignal::Right => self.right,
        }
    }

    /// Sample the keyboard into raw input.
    pub fn read(&self, keys: &ButtonInput<KeyCode>) -> RawMotionInput {
        let mut raw = RawMotionInput::default();
        for signal in InputSignal::ALL {
            raw.set(signal, keys.pressed(self.key(signal)));
        }
        raw
    }
}
