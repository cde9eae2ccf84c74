use crate::config::GameConfig;
use bevy::prelude::*;

/// Setup camera for 2D rendering.
///
/// The playfield spans `(0,0)..(field_width, field_height)`; the camera sits
/// at its centre so the whole field fills the window.
///
/// Must run after [`crate::config::load_game_config`] so the configured field
/// size is used.
pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(config.field_width / 2.0, config.field_height / 2.0, 0.0),
    ));
    eprintln!("[SETUP] Camera spawned");
}
