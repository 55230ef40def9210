//! Animation binding and playback phase.
//!
//! An [`AnimationChannel`] binds the active [`MovementState`] to its
//! animation and visual slots and tracks how far playback has advanced.
//! The channel does not own any rendering; it talks to an
//! [`AnimationProvider`], which exposes per-slot durations, a phase scalar
//! and enable toggles.
//!
//! On the Bevy side a character lists one visual entity per slot in
//! [`MotionVisuals`]; each of those entities carries a [`MotionAnimator`]
//! that receives the phase.

use bevy::prelude::*;

use crate::state::{AnimationIdentity, MovementState};

/// The animation backend seen by the channel.
///
/// `phase` is always normalized to `[0, 1]`.
pub trait AnimationProvider {
    /// Total playback time of a slot, in seconds.
    fn playback_duration(&mut self, identity: AnimationIdentity) -> f32;

    /// Write the phase scalar of a slot.
    fn set_phase(&mut self, identity: AnimationIdentity, phase: f32);

    /// Start or stop the animation of a slot.
    fn set_animation_enabled(&mut self, identity: AnimationIdentity, enabled: bool);

    /// Show or hide the visual of a slot.
    fn set_visual_enabled(&mut self, identity: AnimationIdentity, enabled: bool);
}

/// Provider for characters without visuals. Every slot has zero duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimation;

impl AnimationProvider for NoAnimation {
    fn playback_duration(&mut self, _identity: AnimationIdentity) -> f32 {
        0.0
    }

    fn set_phase(&mut self, _identity: AnimationIdentity, _phase: f32) {}

    fn set_animation_enabled(&mut self, _identity: AnimationIdentity, _enabled: bool) {}

    fn set_visual_enabled(&mut self, _identity: AnimationIdentity, _enabled: bool) {}
}

/// How the channel advances on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationDrive {
    /// Play on elapsed time, looping at the end.
    Elapse,
    /// Jump to a normalized phase that tracks a physical quantity.
    Scrub(f32),
}

/// Playback state of the animation bound to the active movement state.
///
/// The normalized phase is always derived from `elapsed`; it is never stored
/// separately.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationChannel {
    state: MovementState,
    elapsed: f32,
    playback_duration: f32,
    /// Loops completed since the last bind.
    cycles: u32,
    bound: bool,
}

impl AnimationChannel {
    /// An unbound channel. The first [`bind`](Self::bind) enables its slot
    /// without disabling anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `state`: disable the previous slot pair, restart playback,
    /// enable the new pair.
    pub fn bind(&mut self, state: MovementState, provider: &mut dyn AnimationProvider) {
        if self.bound {
            provider.set_animation_enabled(self.state.animation(), false);
            provider.set_visual_enabled(self.state.visual(), false);
        }

        self.state = state;
        self.elapsed = 0.0;
        self.cycles = 0;
        self.bound = true;
        self.playback_duration = provider.playback_duration(state.animation()).max(0.0);

        provider.set_animation_enabled(state.animation(), true);
        provider.set_visual_enabled(state.visual(), true);
        provider.set_phase(state.animation(), 0.0);
    }

    /// Advance playback by `delta` seconds, wrapping to the start when the
    /// end is passed.
    pub fn advance_by_time(&mut self, delta: f32, provider: &mut dyn AnimationProvider) {
        self.elapsed += delta;
        if self.elapsed > self.playback_duration {
            self.elapsed = 0.0;
            self.cycles = self.cycles.saturating_add(1);
        }
        provider.set_phase(self.state.animation(), self.phase());
    }

    /// Jump to a normalized phase (clamped to `[0, 1]`).
    pub fn advance_to_phase(&mut self, phase: f32, provider: &mut dyn AnimationProvider) {
        self.elapsed = phase.clamp(0.0, 1.0) * self.playback_duration;
        provider.set_phase(self.state.animation(), self.phase());
    }

    pub fn advance(&mut self, drive: AnimationDrive, delta: f32, provider: &mut dyn AnimationProvider) {
        match drive {
            AnimationDrive::Elapse => self.advance_by_time(delta, provider),
            AnimationDrive::Scrub(phase) => self.advance_to_phase(phase, provider),
        }
    }

    /// Whether playback has reached the end at least once since the last bind.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.playback_duration || self.cycles > 0
    }

    /// Normalized playback position.
    pub fn phase(&self) -> f32 {
        if self.playback_duration > 0.0 {
            (self.elapsed / self.playback_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn state(&self) -> MovementState {
        self.state
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn playback_duration(&self) -> f32 {
        self.playback_duration
    }
}

/// Playback target for one animation slot.
///
/// Sits on a visual entity listed in [`MotionVisuals`]. The motion systems
/// write `phase` and `playing`; when `frame_count` is non-zero the
/// presentation system maps the phase onto the sprite's atlas index.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MotionAnimator {
    /// Seconds for one full playback.
    pub playback_duration: f32,
    /// Frames in the sprite sheet (0 when the animation is not frame-based).
    pub frame_count: usize,
    /// Normalized playback position.
    pub phase: f32,
    pub playing: bool,
}

impl Default for MotionAnimator {
    fn default() -> Self {
        Self {
            playback_duration: 1.0,
            frame_count: 0,
            phase: 0.0,
            playing: false,
        }
    }
}

impl MotionAnimator {
    pub fn new(playback_duration: f32) -> Self {
        Self {
            playback_duration,
            ..default()
        }
    }

    /// Builder: set the sprite sheet frame count.
    pub fn with_frames(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Sheet frame for the current phase.
    pub fn frame(&self) -> usize {
        if self.frame_count == 0 {
            return 0;
        }
        let frame = (self.phase.clamp(0.0, 1.0) * self.frame_count as f32) as usize;
        frame.min(self.frame_count - 1)
    }
}

/// The visual entity of each animation slot of a character.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MotionVisuals {
    pub idle: Entity,
    pub running: Entity,
    pub jump_normal: Entity,
    pub jump_spin: Entity,
    pub morph: Entity,
}

impl MotionVisuals {
    pub fn get(&self, identity: AnimationIdentity) -> Entity {
        match identity {
            AnimationIdentity::Idle => self.idle,
            AnimationIdentity::Running => self.running,
            AnimationIdentity::JumpNormal => self.jump_normal,
            AnimationIdentity::JumpSpin => self.jump_spin,
            AnimationIdentity::Morph => self.morph,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnimationIdentity, Entity)> + '_ {
        AnimationIdentity::ALL
            .into_iter()
            .map(|identity| (identity, self.get(identity)))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingProvider;
    use super::*;

    #[test]
    fn first_bind_enables_without_disabling() {
        let mut provider = RecordingProvider::uniform(1.0);
        let mut channel = AnimationChannel::new();
        assert!(!channel.is_bound());

        channel.bind(MovementState::Idle, &mut provider);

        assert!(channel.is_bound());
        assert!(provider.disabled.is_empty());
        assert!(provider.playing.contains(&AnimationIdentity::Idle));
        assert!(provider.visible.contains(&AnimationIdentity::Idle));
        assert_eq!(provider.phase(AnimationIdentity::Idle), Some(0.0));
    }

    #[test]
    fn rebind_swaps_slots_and_resets_playback() {
        let mut provider = RecordingProvider::uniform(1.0);
        provider.durations.insert(AnimationIdentity::JumpNormal, 0.4);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::Idle, &mut provider);
        channel.advance_by_time(0.5, &mut provider);

        channel.bind(MovementState::JumpStart, &mut provider);

        assert_eq!(channel.state(), MovementState::JumpStart);
        assert_eq!(channel.elapsed(), 0.0);
        assert_eq!(channel.playback_duration(), 0.4);
        assert_eq!(provider.disabled, vec![AnimationIdentity::Idle]);
        assert!(!provider.visible.contains(&AnimationIdentity::Idle));
        assert!(provider.playing.contains(&AnimationIdentity::JumpNormal));
        assert!(provider.visible.contains(&AnimationIdentity::JumpNormal));
    }

    #[test]
    fn rebind_within_shared_slot_keeps_it_enabled() {
        let mut provider = RecordingProvider::uniform(1.0);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::GroundMoveStart, &mut provider);
        channel.bind(MovementState::GroundMove, &mut provider);

        assert!(provider.playing.contains(&AnimationIdentity::Running));
        assert!(provider.visible.contains(&AnimationIdentity::Running));
    }

    #[test]
    fn elapsed_time_wraps_past_the_end() {
        let mut provider = RecordingProvider::uniform(1.0);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::Idle, &mut provider);

        channel.advance_by_time(0.6, &mut provider);
        assert!((channel.phase() - 0.6).abs() < 1e-6);
        assert!(!channel.is_finished());

        channel.advance_by_time(0.6, &mut provider);
        assert_eq!(channel.elapsed(), 0.0);
        assert_eq!(provider.phase(AnimationIdentity::Idle), Some(0.0));
    }

    #[test]
    fn reaching_the_end_exactly_finishes_without_wrapping() {
        let mut provider = RecordingProvider::uniform(0.5);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::MorphStart, &mut provider);

        channel.advance_by_time(0.25, &mut provider);
        channel.advance_by_time(0.25, &mut provider);

        assert!(channel.is_finished());
        assert_eq!(channel.phase(), 1.0);
    }

    #[test]
    fn finished_is_idempotent() {
        let mut provider = RecordingProvider::uniform(0.5);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::MorphEnd, &mut provider);
        channel.advance_by_time(0.7, &mut provider);

        assert!(channel.is_finished());
        assert!(channel.is_finished());
        assert!(channel.is_finished());
    }

    #[test]
    fn finished_resets_on_bind() {
        let mut provider = RecordingProvider::uniform(0.5);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::MorphStart, &mut provider);
        channel.advance_by_time(0.7, &mut provider);
        assert!(channel.is_finished());

        channel.bind(MovementState::Morphed, &mut provider);
        assert!(!channel.is_finished());
    }

    #[test]
    fn scrub_clamps_and_scales() {
        let mut provider = RecordingProvider::uniform(2.0);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::GroundMove, &mut provider);

        channel.advance_to_phase(0.25, &mut provider);
        assert_eq!(channel.elapsed(), 0.5);
        assert_eq!(provider.phase(AnimationIdentity::Running), Some(0.25));

        channel.advance_to_phase(3.0, &mut provider);
        assert_eq!(channel.elapsed(), 2.0);
        assert_eq!(channel.phase(), 1.0);

        channel.advance_to_phase(-1.0, &mut provider);
        assert_eq!(channel.phase(), 0.0);
    }

    #[test]
    fn advance_dispatches_on_drive() {
        let mut provider = RecordingProvider::uniform(1.0);
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::GroundMove, &mut provider);

        channel.advance(AnimationDrive::Scrub(0.5), 0.1, &mut provider);
        assert_eq!(channel.elapsed(), 0.5);

        channel.advance(AnimationDrive::Elapse, 0.1, &mut provider);
        assert!((channel.elapsed() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_slot_is_always_finished() {
        let mut provider = NoAnimation;
        let mut channel = AnimationChannel::new();
        channel.bind(MovementState::MorphStart, &mut provider);

        assert!(channel.is_finished());
        assert_eq!(channel.phase(), 0.0);
        channel.advance_by_time(0.1, &mut provider);
        assert!(channel.is_finished());
    }

    #[test]
    fn animator_maps_phase_to_frames() {
        let mut animator = MotionAnimator::new(0.8).with_frames(4);
        assert_eq!(animator.frame(), 0);

        animator.phase = 0.5;
        assert_eq!(animator.frame(), 2);

        animator.phase = 1.0;
        assert_eq!(animator.frame(), 3);

        assert_eq!(MotionAnimator::default().frame(), 0);
    }

    #[test]
    fn visuals_lookup_by_identity() {
        let entities: Vec<Entity> = (1..=5).map(Entity::from_raw).collect();
        let visuals = MotionVisuals {
            idle: entities[0],
            running: entities[1],
            jump_normal: entities[2],
            jump_spin: entities[3],
            morph: entities[4],
        };

        assert_eq!(visuals.get(AnimationIdentity::JumpSpin), entities[3]);
        let listed: Vec<_> = visuals.iter().map(|(_, e)| e).collect();
        assert_eq!(listed, entities);
    }
}
