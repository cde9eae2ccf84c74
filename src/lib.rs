//! Earshot: an audio-first beacon-capture game.
//!
//! The player flies a small craft around a wrapping playfield and hunts a
//! sound beacon by ear: a looping guidance tone rises in pitch and volume as
//! the nose swings onto the target, pings mark range entry and a successful
//! scan, and a whoosh/chime pair confirms capture attempts.  Vision is
//! optional; the gizmo rendering exists as a sighted aid and debug surface.
//!
//! The whole guidance loop runs in `FixedUpdate` at [`constants::TICK_HZ`].
//! [`GuidancePlugin`] wires the core (input, kinematics, target lifecycle,
//! alignment, audio direction, capture) and is fully headless-capable; the
//! binary adds the window, rendering, and audio device layers on top.

pub mod alignment;
pub mod audio;
pub mod capture;
pub mod config;
pub mod constants;
pub mod craft;
pub mod error;
pub mod graphics;
pub mod render;
pub mod target;
pub mod timing;

use bevy::prelude::*;

/// Core guidance loop: every gameplay resource plus the fixed-cadence tick
/// pipeline. Contains no windowing, rendering, or audio-device dependency, so
/// headless tests can run it under `MinimalPlugins`.
pub struct GuidancePlugin;

impl Plugin for GuidancePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::GameConfig>()
            .init_resource::<craft::CraftIntent>()
            .init_resource::<target::TargetLifecycle>()
            .init_resource::<alignment::AlignmentSample>()
            .init_resource::<audio::AudioDirector>()
            .init_resource::<audio::backend::AudioCommands>()
            .init_resource::<capture::CaptureState>()
            // Present under DefaultPlugins already; headless apps get an
            // inert keyboard state.
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(Time::<Fixed>::from_hz(constants::TICK_HZ))
            .add_systems(
                Startup,
                (config::load_game_config, craft::spawn_craft).chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    craft::craft_intent_clear_system,
                    craft::keyboard_to_intent_system,
                    // Lifecycle before control: the sticky-rotation pre-check
                    // must see a target spawned this very tick.
                    target::target_lifecycle_system,
                    craft::craft_control_system,
                    craft::craft_integrate_system,
                    alignment::alignment_system,
                    audio::audio_director_system,
                    capture::capture_system,
                )
                    .chain(),
            );
    }
}
