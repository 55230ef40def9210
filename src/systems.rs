//! Core controller systems.
//!
//! These systems feed raw input and contacts into each [`CharacterRig`],
//! run its tick, write the committed velocity back through the physics
//! backend and mirror the result onto the character's visuals. They are
//! generic over the physics backend to allow different physics engines to
//! be used.

use bevy::prelude::*;

use crate::animation::{AnimationProvider, MotionAnimator, MotionVisuals};
use crate::backend::MotionBackend;
use crate::config::MotionConfig;
use crate::error::MotionError;
use crate::input::{MotionKeyBindings, RawMotionInput};
use crate::rig::{CharacterRig, TickContext, TickOutcome};
use crate::state::AnimationIdentity;

/// Marks a character whose motion stopped on an error.
///
/// Halted characters are skipped by [`tick_motion_rigs`]. The halt is lifted
/// automatically only when it was caused by an invalid [`MotionConfig`] that
/// has since been fixed.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MotionHalted(pub MotionError);

/// Sample the keyboard into [`RawMotionInput`] for characters with key bindings.
pub fn read_keyboard_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut q_characters: Query<(&MotionKeyBindings, &mut RawMotionInput)>,
) {
    let Some(keys) = keys else {
        return;
    };

    for (bindings, mut input) in &mut q_characters {
        let raw = bindings.read(&keys);
        if *input != raw {
            *input = raw;
        }
    }
}

/// Validate configs when they are added or changed.
pub fn validate_motion_configs(
    mut commands: Commands,
    q_configs: Query<(Entity, &MotionConfig, Option<&MotionHalted>), Changed<MotionConfig>>,
) {
    for (entity, config, halted) in &q_configs {
        match config.validate() {
            Ok(()) => {
                if let Some(MotionHalted(MotionError::InvalidConfig { .. })) = halted {
                    debug!("{entity}: motion config fixed, resuming");
                    commands.entity(entity).remove::<MotionHalted>();
                }
            }
            Err(err) => {
                error!("{entity}: {err}");
                commands.entity(entity).insert(MotionHalted(err));
            }
        }
    }
}

/// Run one tick of every active [`CharacterRig`].
///
/// Velocity is read from the backend before the tick and written back only
/// when the tick committed one. A rig that fails is halted.
pub fn tick_motion_rigs<B: MotionBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let rigs: Vec<(
        Entity,
        CharacterRig,
        MotionConfig,
        RawMotionInput,
        Option<MotionVisuals>,
    )> = world
        .query_filtered::<(
            Entity,
            &CharacterRig,
            &MotionConfig,
            Option<&RawMotionInput>,
            Option<&MotionVisuals>,
        ), Without<MotionHalted>>()
        .iter(world)
        .map(|(e, rig, config, input, visuals)| {
            (
                e,
                rig.clone(),
                *config,
                input.copied().unwrap_or_default(),
                visuals.copied(),
            )
        })
        .collect();

    for (entity, mut rig, config, input, visuals) in rigs {
        let ctx = TickContext {
            input,
            contacts: B::get_contacts(world, entity),
            body_velocity: B::get_velocity(world, entity),
            delta: dt,
            config: &config,
        };

        let result = {
            let mut provider = WorldAnimationProvider::new(world, entity, visuals);
            rig.tick(&ctx, &mut provider)
        };

        let halt = match result {
            Ok(outcome) => {
                if let Some(velocity) = outcome.committed_velocity() {
                    B::set_velocity(world, entity, velocity);
                }
                log_transition(entity, &outcome);
                None
            }
            Err(err) => {
                error!("{entity}: motion halted: {err}");
                Some(MotionHalted(err))
            }
        };

        let diagnostics = rig.diagnostics();
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert((rig, diagnostics));
            if let Some(halt) = halt {
                entity_mut.insert(halt);
            }
        }
    }
}

fn log_transition(entity: Entity, outcome: &TickOutcome) {
    match *outcome {
        TickOutcome::Rebound { from, to } => {
            debug!("{entity}: {from:?} -> {to:?} (before integration)");
        }
        TickOutcome::Integrated { from, to, velocity } if from != to => {
            debug!("{entity}: {from:?} -> {to:?} (after integration, velocity {velocity})");
        }
        TickOutcome::Integrated { .. } => {}
    }
}

/// Mirror each character's facing into `Sprite::flip_x`.
///
/// Applies to every visual listed in [`MotionVisuals`], or to a sprite on the
/// character itself when it has no visuals.
pub fn sync_visual_facing(
    q_rigs: Query<(Entity, &CharacterRig, Option<&MotionVisuals>)>,
    mut q_sprites: Query<&mut Sprite>,
) {
    for (entity, rig, visuals) in &q_rigs {
        let flip = rig.facing().is_left();
        let mut apply = |target: Entity| {
            if let Ok(mut sprite) = q_sprites.get_mut(target) {
                if sprite.flip_x != flip {
                    sprite.flip_x = flip;
                }
            }
        };

        match visuals {
            Some(visuals) => visuals.iter().for_each(|(_, target)| apply(target)),
            None => apply(entity),
        }
    }
}

/// Map animator phases onto sprite sheet frames.
pub fn sync_animator_frames(
    mut q_animators: Query<(&MotionAnimator, &mut Sprite), Changed<MotionAnimator>>,
) {
    for (animator, mut sprite) in &mut q_animators {
        if animator.frame_count == 0 {
            continue;
        }
        let frame = animator.frame();
        if let Some(atlas) = sprite.texture_atlas.as_mut() {
            atlas.index = frame;
        }
    }
}

/// [`AnimationProvider`] over a character's [`MotionVisuals`] entities.
///
/// Durations and phases live in each visual's [`MotionAnimator`]; visuals are
/// shown and hidden through [`Visibility`]. Without visuals every slot has
/// zero duration.
pub(crate) struct WorldAnimationProvider<'w> {
    world: &'w mut World,
    owner: Entity,
    visuals: Option<MotionVisuals>,
}

impl<'w> WorldAnimationProvider<'w> {
    pub(crate) fn new(world: &'w mut World, owner: Entity, visuals: Option<MotionVisuals>) -> Self {
        Self {
            world,
            owner,
            visuals,
        }
    }

    fn animator_mut(&mut self, identity: AnimationIdentity) -> Option<Mut<'_, MotionAnimator>> {
        let target = self.visuals?.get(identity);
        self.world.get_mut::<MotionAnimator>(target)
    }
}

impl AnimationProvider for WorldAnimationProvider<'_> {
    fn playback_duration(&mut self, identity: AnimationIdentity) -> f32 {
        let Some(visuals) = self.visuals else {
            return 0.0;
        };
        let target = visuals.get(identity);
        match self.world.get::<MotionAnimator>(target) {
            Some(animator) => animator.playback_duration,
            None => {
                warn!(
                    "{}: visual {target} for {identity:?} has no MotionAnimator",
                    self.owner
                );
                0.0
            }
        }
    }

    fn set_phase(&mut self, identity: AnimationIdentity, phase: f32) {
        if let Some(mut animator) = self.animator_mut(identity) {
            if animator.phase != phase {
                animator.phase = phase;
            }
        }
    }

    fn set_animation_enabled(&mut self, identity: AnimationIdentity, enabled: bool) {
        if let Some(mut animator) = self.animator_mut(identity) {
            animator.playing = enabled;
        }
    }

    fn set_visual_enabled(&mut self, identity: AnimationIdentity, enabled: bool) {
        let Some(visuals) = self.visuals else {
            return;
        };
        if let Some(mut visibility) = self.world.get_mut::<Visibility>(visuals.get(identity)) {
            *visibility = if enabled {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
}
