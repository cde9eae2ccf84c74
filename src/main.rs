use bevy::prelude::*;
use bevy::window::WindowResolution;

use earshot::audio::output;
use earshot::config;
use earshot::constants::{FIELD_HEIGHT, FIELD_WIDTH};
use earshot::graphics;
use earshot::render::{self, RenderToggles};
use earshot::GuidancePlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Earshot".into(),
            resolution: WindowResolution::new(FIELD_WIDTH as u32, FIELD_HEIGHT as u32),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    .init_resource::<RenderToggles>()
    .add_plugins(GuidancePlugin)
    .add_systems(
        Startup,
        (
            // Config loads inside GuidancePlugin's startup chain; camera and
            // HUD must see the final field/font values.
            graphics::setup_camera.after(config::load_game_config),
            render::setup_hud.after(config::load_game_config),
            output::setup_audio_output,
        ),
    )
    .add_systems(
        Update,
        (
            render::render_toggle_system,
            render::gizmo_rendering_system,
            render::hud_score_display_system,
            render::hud_guidance_display_system,
        ),
    )
    .add_systems(
        Update,
        (
            output::audio_asset_watchdog_system,
            output::apply_audio_commands_system,
            output::sync_audio_device_system,
        )
            .chain(),
    );

    app.run();
}
