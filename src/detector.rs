//! Edge detection for a single boolean signal.
//!
//! A detector is fed the raw value of a signal once per tick and reports the
//! held state, the rising edge, and how long the signal has been (or was
//! last) held.

use bevy::prelude::*;

/// Tracks one boolean signal across fixed ticks.
///
/// A *capture* is the contiguous run of ticks during which the signal is held.
/// The tick a capture starts reports [`is_first_tick`](Self::is_first_tick) and
/// does not accumulate time; each following held tick adds its delta. When the
/// signal drops, the accumulated time is stored as the last capture duration.
///
/// # Example
///
/// ```rust
/// use motion_state_controller::prelude::*;
///
/// let mut jump = EdgeInputDetector::new();
/// jump.set(true, 0.1);
/// assert!(jump.is_first_tick());
/// assert_eq!(jump.accumulator(), 0.0);
///
/// jump.set(true, 0.1);
/// jump.set(false, 0.1);
/// assert!(!jump.is_active());
/// assert!((jump.last_capture_duration() - 0.1).abs() < 1e-6);
/// ```
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeInputDetector {
    active: bool,
    first_tick: bool,
    last_capture_duration: f32,
    accumulator: f32,
}

impl EdgeInputDetector {
    /// Create a detector in the "never captured" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the signal value for this tick.
    pub fn set(&mut self, next: bool, delta: f32) {
        match (self.active, next) {
            (false, false) => {}
            // Capture ends
            (true, false) => {
                self.last_capture_duration = self.accumulator;
                self.accumulator = 0.0;
                self.first_tick = false;
                self.active = false;
            }
            // Capture starts; the accumulator stays frozen on this tick
            (false, true) => {
                self.active = true;
                self.first_tick = true;
            }
            // Capture continues
            (true, true) => {
                self.accumulator += delta;
                self.first_tick = false;
            }
        }
    }

    /// Whether the signal is currently held.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True only on the tick the signal went from released to held.
    #[inline]
    pub fn is_first_tick(&self) -> bool {
        self.first_tick
    }

    /// True when the signal is held and this is the tick it started.
    #[inline]
    pub fn just_activated(&self) -> bool {
        self.active && self.first_tick
    }

    /// Duration of the capture that most recently ended.
    ///
    /// Holds its value while a new capture is in progress.
    #[inline]
    pub fn last_capture_duration(&self) -> f32 {
        self.last_capture_duration
    }

    /// Time accumulated by the current capture (0 when released).
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }
}
