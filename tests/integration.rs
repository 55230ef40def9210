//! Integration tests for the motion controller.
//!
//! These tests drive a `MinimalPlugins` app one fixed tick at a time with the
//! manual backend, so contacts and body velocity are fully controlled by the
//! test. Each test produces PROOF through explicit state/velocity checks.

use bevy::prelude::*;
use motion_state_controller::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Create a minimal test app with the motion controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(MotionControllerPlugin::<ManualBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a grounded character with default config.
fn spawn_character(app: &mut App) -> Entity {
    spawn_character_with_config(app, MotionConfig::default())
}

/// Spawn a grounded character with custom config.
fn spawn_character_with_config(app: &mut App, config: MotionConfig) -> Entity {
    app.world_mut()
        .spawn((
            CharacterRig::new(),
            config,
            RawMotionInput::default(),
            ContactSignals::grounded(),
            BodyVelocity::default(),
        ))
        .id()
}

/// Spawn one visual per animation slot, hidden, with the given durations.
fn spawn_visuals(app: &mut App, durations: [f32; 5]) -> MotionVisuals {
    let mut spawn = |duration: f32| {
        app.world_mut()
            .spawn((MotionAnimator::new(duration), Visibility::Hidden))
            .id()
    };
    MotionVisuals {
        idle: spawn(durations[0]),
        running: spawn(durations[1]),
        jump_normal: spawn(durations[2]),
        jump_spin: spawn(durations[3]),
        morph: spawn(durations[4]),
    }
}

/// Run one fixed tick.
fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Run the app for N fixed ticks.
fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn set_input(app: &mut App, entity: Entity, input: RawMotionInput) {
    *app.world_mut().get_mut::<RawMotionInput>(entity).unwrap() = input;
}

fn set_contacts(app: &mut App, entity: Entity, contacts: ContactSignals) {
    *app.world_mut().get_mut::<ContactSignals>(entity).unwrap() = contacts;
}

fn rig(app: &App, entity: Entity) -> &CharacterRig {
    app.world().get::<CharacterRig>(entity).unwrap()
}

fn body(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<BodyVelocity>(entity).unwrap().0
}

fn state(app: &App, entity: Entity) -> MovementState {
    rig(app, entity).state()
}

fn jump() -> RawMotionInput {
    RawMotionInput {
        jump: true,
        ..default()
    }
}

fn right() -> RawMotionInput {
    RawMotionInput {
        right: true,
        ..default()
    }
}

fn left() -> RawMotionInput {
    RawMotionInput {
        left: true,
        ..default()
    }
}

// ==================== Jump Tests ====================

mod jumping {
    use super::*;

    #[test]
    fn first_jump_tick_only_rebinds() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);

        set_input(&mut app, character, jump());
        tick(&mut app);

        // PROOF: pass 1 moved to JumpStart and nothing was integrated
        assert_eq!(state(&app, character), MovementState::JumpStart);
        assert_eq!(body(&app, character), Vec2::ZERO);
        assert_eq!(rig(&app, character).channel().elapsed(), 0.0);

        let diagnostics = app.world().get::<MotionDiagnostics>(character).unwrap();
        assert_eq!(diagnostics.state, MovementState::JumpStart);
        assert!(diagnostics.input.jump);
    }

    #[test]
    fn held_jump_launches_at_max_jump_velocity() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump_velocity(6.0);
        let character = spawn_character_with_config(&mut app, config);

        set_input(&mut app, character, jump());
        run_frames(&mut app, 2);

        // PROOF: the launch tick wrote the impulse and moved on
        assert_eq!(state(&app, character), MovementState::JumpingNormal);
        assert_eq!(body(&app, character).y, 6.0);
    }

    #[test]
    fn holding_jump_does_not_bounce() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);

        set_input(&mut app, character, jump());
        run_frames(&mut app, 2);
        assert_eq!(state(&app, character), MovementState::JumpingNormal);

        // Touch down with jump still held: land, run out, settle.
        *app.world_mut().get_mut::<BodyVelocity>(character).unwrap() = BodyVelocity(Vec2::ZERO);
        run_frames(&mut app, 6);

        // PROOF: a held jump never re-triggers from the ground
        assert_eq!(state(&app, character), MovementState::Idle);
    }

    #[test]
    fn landing_passes_through_jump_end() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);

        set_input(&mut app, character, jump());
        run_frames(&mut app, 2);

        set_input(&mut app, character, RawMotionInput::default());
        set_contacts(&mut app, character, ContactSignals::airborne());
        run_frames(&mut app, 5);
        assert_eq!(state(&app, character), MovementState::JumpingNormal);

        *app.world_mut().get_mut::<BodyVelocity>(character).unwrap() =
            BodyVelocity(Vec2::new(0.0, -0.5));
        set_contacts(&mut app, character, ContactSignals::grounded());
        tick(&mut app);

        // PROOF: landing is its own state
        assert_eq!(state(&app, character), MovementState::JumpEnd);
        assert!(rig(&app, character).contacts().just_landed());
    }

    #[test]
    fn ground_contact_lagging_the_launch_keeps_the_jump() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_jump_velocity(6.0);
        let character = spawn_character_with_config(&mut app, config);

        set_input(&mut app, character, jump());
        run_frames(&mut app, 2);
        assert_eq!(state(&app, character), MovementState::JumpingNormal);

        // The body is rising but still inside the ground probe's reach.
        run_frames(&mut app, 3);
        assert_eq!(state(&app, character), MovementState::JumpingNormal);

        set_contacts(&mut app, character, ContactSignals::airborne());
        run_frames(&mut app, 3);

        // PROOF: the jump survived contact lag and the character is still live
        assert_eq!(state(&app, character), MovementState::JumpingNormal);
        assert!(app.world().get::<MotionHalted>(character).is_none());

        *app.world_mut().get_mut::<BodyVelocity>(character).unwrap() =
            BodyVelocity(Vec2::new(0.0, -1.0));
        set_contacts(&mut app, character, ContactSignals::grounded());
        run_frames(&mut app, 6);

        assert_eq!(state(&app, character), MovementState::Idle);
        assert!(app.world().get::<MotionHalted>(character).is_none());
    }

    #[test]
    fn accelerated_gravity_pulls_airborne_characters() {
        let mut app = create_test_app();
        let config = MotionConfig::default()
            .with_fall_velocity(100.0)
            .with_gravity(GravityModel::Accelerated { gravity: 60.0 });
        let character = app
            .world_mut()
            .spawn((
                CharacterRig::new().starting_in(MovementState::JumpingNormal),
                config,
                RawMotionInput::default(),
                ContactSignals::airborne(),
                BodyVelocity::default(),
            ))
            .id();

        run_frames(&mut app, 3);

        // PROOF: three ticks of 60 * DT each
        let vy = body(&app, character).y;
        assert!((vy + 3.0 * 60.0 * DT).abs() < 1e-4, "vy = {vy}");
    }

    #[test]
    fn terminal_clamp_caps_falling() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_fall_velocity(4.0);
        let character = app
            .world_mut()
            .spawn((
                CharacterRig::new().starting_in(MovementState::JumpingNormal),
                config,
                RawMotionInput::default(),
                ContactSignals::airborne(),
                BodyVelocity(Vec2::new(0.0, -50.0)),
            ))
            .id();

        tick(&mut app);

        // PROOF: fall speed clamped to the terminal velocity
        assert_eq!(body(&app, character).y, -4.0);
    }
}

// ==================== Running Tests ====================

mod running {
    use super::*;

    #[test]
    fn running_accelerates_to_the_cap() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_run_velocity(10.0);
        let character = spawn_character_with_config(&mut app, config);

        set_input(&mut app, character, right());
        tick(&mut app);
        assert_eq!(state(&app, character), MovementState::GroundMoveStart);

        let mut previous = 0.0;
        for _ in 0..10 {
            tick(&mut app);
            let vx = body(&app, character).x;
            // PROOF: speed only grows and never passes the cap
            assert!(vx >= previous);
            assert!(vx <= 10.0);
            previous = vx;
        }

        assert_eq!(body(&app, character).x, 10.0);
        assert_eq!(state(&app, character), MovementState::GroundMove);
        assert_eq!(rig(&app, character).facing(), Facing::Right);
    }

    #[test]
    fn releasing_input_settles_to_idle() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_run_velocity(10.0);
        let character = spawn_character_with_config(&mut app, config);

        set_input(&mut app, character, right());
        run_frames(&mut app, 10);

        set_input(&mut app, character, RawMotionInput::default());
        let mut previous = body(&app, character).x;
        for _ in 0..20 {
            tick(&mut app);
            let vx = body(&app, character).x;
            // PROOF: auto deceleration never overshoots past zero
            assert!(vx <= previous);
            assert!(vx >= 0.0);
            previous = vx;
        }

        assert_eq!(body(&app, character).x, 0.0);
        assert_eq!(state(&app, character), MovementState::Idle);
    }

    #[test]
    fn running_left_turns_the_character_and_its_sprite() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_run_velocity(10.0);
        let character = spawn_character_with_config(&mut app, config);
        app.world_mut().entity_mut(character).insert(Sprite::default());

        set_input(&mut app, character, left());
        run_frames(&mut app, 3);

        // PROOF: facing flipped and velocity follows it
        assert_eq!(rig(&app, character).facing(), Facing::Left);
        assert!(body(&app, character).x < 0.0);
        assert!(app.world().get::<Sprite>(character).unwrap().flip_x);
    }

    #[test]
    fn scrubbed_run_phase_tracks_speed() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_run_velocity(10.0);
        let character = spawn_character_with_config(&mut app, config);
        let visuals = spawn_visuals(&mut app, [1.0, 0.5, 1.0, 1.0, 1.0]);
        app.world_mut().entity_mut(character).insert(visuals);

        set_input(&mut app, character, right());
        run_frames(&mut app, 4);
        assert_eq!(state(&app, character), MovementState::GroundMove);

        let vx = body(&app, character).x;
        let animator = app.world().get::<MotionAnimator>(visuals.running).unwrap();

        // PROOF: running phase is |vx| / max_run
        assert!((animator.phase - vx / 10.0).abs() < 1e-5);
        assert!(animator.playing);
    }
}

// ==================== Morph Tests ====================

mod morphing {
    use super::*;

    #[test]
    fn morph_cycle_waits_for_animations() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        let visuals = spawn_visuals(&mut app, [3.0 * DT, 1.0, 1.0, 1.0, 1.0]);
        app.world_mut().entity_mut(character).insert(visuals);

        set_input(
            &mut app,
            character,
            RawMotionInput {
                down: true,
                ..default()
            },
        );
        tick(&mut app);
        assert_eq!(state(&app, character), MovementState::MorphStart);

        let mut ticks = 0;
        while state(&app, character) == MovementState::MorphStart {
            tick(&mut app);
            ticks += 1;
            assert!(ticks < 20, "morph start never finished");
        }

        // PROOF: the transition took the animation's length
        assert!(ticks >= 3);
        assert_eq!(state(&app, character), MovementState::Morphed);
        assert_eq!(
            app.world().get::<Visibility>(visuals.morph),
            Some(&Visibility::Inherited)
        );
        assert_eq!(
            app.world().get::<Visibility>(visuals.idle),
            Some(&Visibility::Hidden)
        );

        set_input(
            &mut app,
            character,
            RawMotionInput {
                up: true,
                ..default()
            },
        );
        tick(&mut app);
        assert_eq!(state(&app, character), MovementState::MorphEnd);

        let mut ticks = 0;
        while state(&app, character) == MovementState::MorphEnd {
            tick(&mut app);
            ticks += 1;
            assert!(ticks < 20, "morph end never finished");
        }

        // PROOF: unmorphing on the ground resumes running
        assert_eq!(state(&app, character), MovementState::GroundMove);
    }
}

// ==================== Visual Tests ====================

mod visuals {
    use super::*;

    #[test]
    fn state_change_swaps_visible_slot() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        let visuals = spawn_visuals(&mut app, [1.0; 5]);
        app.world_mut().entity_mut(character).insert(visuals);

        tick(&mut app);

        // PROOF: idle slot bound on the first tick
        assert_eq!(
            app.world().get::<Visibility>(visuals.idle),
            Some(&Visibility::Inherited)
        );
        assert!(app.world().get::<MotionAnimator>(visuals.idle).unwrap().playing);

        set_input(&mut app, character, jump());
        tick(&mut app);

        // PROOF: jump slot replaced idle
        assert_eq!(
            app.world().get::<Visibility>(visuals.idle),
            Some(&Visibility::Hidden)
        );
        assert!(!app.world().get::<MotionAnimator>(visuals.idle).unwrap().playing);
        assert_eq!(
            app.world().get::<Visibility>(visuals.jump_normal),
            Some(&Visibility::Inherited)
        );
        assert!(app.world().get::<MotionAnimator>(visuals.jump_normal).unwrap().playing);
    }

    #[test]
    fn idle_animation_plays_on_time() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        let visuals = spawn_visuals(&mut app, [1.0; 5]);
        app.world_mut().entity_mut(character).insert(visuals);

        run_frames(&mut app, 6);

        // PROOF: idle phase advanced by elapsed time from the first tick
        let phase = app.world().get::<MotionAnimator>(visuals.idle).unwrap().phase;
        assert!((phase - 6.0 * DT).abs() < 1e-4, "phase = {phase}");
    }
}

// ==================== Error Handling Tests ====================

mod halting {
    use super::*;

    #[test]
    fn idle_without_ground_halts_the_character() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        set_contacts(&mut app, character, ContactSignals::airborne());

        tick(&mut app);

        // PROOF: the violation is surfaced and the rig stops
        let halted = app.world().get::<MotionHalted>(character).unwrap();
        assert_eq!(
            halted.0,
            MotionError::PreconditionViolated {
                state: MovementState::Idle,
                requirement: Requirement::Grounded,
            }
        );
        assert!(app.world().get::<MotionDiagnostics>(character).unwrap().halted);

        set_contacts(&mut app, character, ContactSignals::grounded());
        set_input(&mut app, character, right());
        run_frames(&mut app, 5);

        assert_eq!(state(&app, character), MovementState::Idle);
        assert_eq!(body(&app, character), Vec2::ZERO);
    }

    #[test]
    fn invalid_config_halts_until_fixed() {
        let mut app = create_test_app();
        let config = MotionConfig::default().with_max_run_velocity(0.0);
        let character = spawn_character_with_config(&mut app, config);

        set_input(&mut app, character, right());
        tick(&mut app);

        // PROOF: the rig never ran
        assert!(matches!(
            app.world().get::<MotionHalted>(character),
            Some(MotionHalted(MotionError::InvalidConfig {
                field: "max_run_velocity",
                ..
            }))
        ));
        assert_eq!(state(&app, character), MovementState::Idle);

        app.world_mut().get_mut::<MotionConfig>(character).unwrap().max_run_velocity = 2.0;
        tick(&mut app);

        // PROOF: fixing the config resumes motion
        assert!(app.world().get::<MotionHalted>(character).is_none());
        assert_eq!(state(&app, character), MovementState::GroundMoveStart);
    }

    #[test]
    fn halted_character_does_not_affect_others() {
        let mut app = create_test_app();
        let broken = spawn_character(&mut app);
        let healthy = spawn_character(&mut app);
        set_contacts(&mut app, broken, ContactSignals::airborne());
        set_input(&mut app, healthy, jump());

        run_frames(&mut app, 2);

        assert!(app.world().get::<MotionHalted>(broken).is_some());
        assert!(app.world().get::<MotionHalted>(healthy).is_none());
        assert_eq!(state(&app, healthy), MovementState::JumpingNormal);
    }
}

// ==================== Keyboard Tests ====================

mod keyboard {
    use super::*;

    #[test]
    fn key_bindings_write_raw_input() {
        let mut app = create_test_app();
        app.insert_resource(ButtonInput::<KeyCode>::default());
        let character = spawn_character(&mut app);
        app.world_mut()
            .entity_mut(character)
            .insert(MotionKeyBindings::default());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::ArrowRight);
        tick(&mut app);

        // PROOF: the arrow key reached the rig
        assert!(app.world().get::<RawMotionInput>(character).unwrap().right);
        assert_eq!(state(&app, character), MovementState::GroundMoveStart);
    }

    #[test]
    fn missing_keyboard_resource_leaves_input_alone() {
        let mut app = create_test_app();
        let character = spawn_character(&mut app);
        app.world_mut()
            .entity_mut(character)
            .insert(MotionKeyBindings::default());
        set_input(&mut app, character, left());

        tick(&mut app);

        assert!(app.world().get::<RawMotionInput>(character).unwrap().left);
        assert_eq!(state(&app, character), MovementState::GroundMoveStart);
    }
}
