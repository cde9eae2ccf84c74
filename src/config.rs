//! Runtime gameplay configuration loaded from `assets/settings.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/settings.toml` and overwrites the defaults with any values present
//! in the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.capture_distance`, `config.align_dot_far`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay and audio configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/settings.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Playfield ────────────────────────────────────────────────────────────
    pub field_width: f32,
    pub field_height: f32,
    pub target_spawn_margin: f32,

    // ── Craft Kinematics ─────────────────────────────────────────────────────
    pub rotation_speed: f32,
    pub sticky_rotation_multiplier: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub stop_epsilon: f32,

    // ── Alignment ────────────────────────────────────────────────────────────
    pub align_dot_far: f32,
    pub align_dot_near: f32,
    pub align_near_dist: f32,
    pub align_far_dist: f32,

    // ── Capture ──────────────────────────────────────────────────────────────
    pub capture_distance: f32,
    pub capture_cooldown_ms: u64,
    pub chime_delay_ms: u64,

    // ── Target Lifecycle ─────────────────────────────────────────────────────
    pub target_active_duration_ms: u64,

    // ── Guidance Audio ───────────────────────────────────────────────────────
    pub guidance_pitch_low: f32,
    pub guidance_pitch_high: f32,
    pub guidance_gain_low: f32,
    pub guidance_gain_high: f32,
    pub range_boost_pitch: f32,
    pub range_boost_gain: f32,
    pub range_pulse_period_ms: u64,
    pub range_pulse_depth: f32,
    pub align_ping_rotation_budget: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
    pub target_draw_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Playfield
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            target_spawn_margin: TARGET_SPAWN_MARGIN,
            // Craft Kinematics
            rotation_speed: ROTATION_SPEED,
            sticky_rotation_multiplier: STICKY_ROTATION_MULTIPLIER,
            max_speed: MAX_SPEED,
            friction: FRICTION,
            stop_epsilon: STOP_EPSILON,
            // Alignment
            align_dot_far: ALIGN_DOT_FAR,
            align_dot_near: ALIGN_DOT_NEAR,
            align_near_dist: ALIGN_NEAR_DIST,
            align_far_dist: ALIGN_FAR_DIST,
            // Capture
            capture_distance: CAPTURE_DISTANCE,
            capture_cooldown_ms: CAPTURE_COOLDOWN_MS,
            chime_delay_ms: CHIME_DELAY_MS,
            // Target Lifecycle
            target_active_duration_ms: TARGET_ACTIVE_DURATION_MS,
            // Guidance Audio
            guidance_pitch_low: GUIDANCE_PITCH_LOW,
            guidance_pitch_high: GUIDANCE_PITCH_HIGH,
            guidance_gain_low: GUIDANCE_GAIN_LOW,
            guidance_gain_high: GUIDANCE_GAIN_HIGH,
            range_boost_pitch: RANGE_BOOST_PITCH,
            range_boost_gain: RANGE_BOOST_GAIN,
            range_pulse_period_ms: RANGE_PULSE_PERIOD_MS,
            range_pulse_depth: RANGE_PULSE_DEPTH,
            align_ping_rotation_budget: ALIGN_PING_ROTATION_BUDGET,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
            target_draw_radius: TARGET_DRAW_RADIUS,
        }
    }
}

/// Startup system: attempt to load `assets/settings.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are printed
/// to stderr but do not abort the game.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/settings.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded game config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present: defaults are already in place, not an error.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_constants() {
        let config = GameConfig::default();
        assert_eq!(config.capture_distance, CAPTURE_DISTANCE);
        assert_eq!(config.align_dot_near, ALIGN_DOT_NEAR);
        assert_eq!(config.target_active_duration_ms, TARGET_ACTIVE_DURATION_MS);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let loaded: GameConfig = toml::from_str("capture_distance = 150.0").unwrap();
        assert_eq!(loaded.capture_distance, 150.0);
        assert_eq!(loaded.capture_cooldown_ms, CAPTURE_COOLDOWN_MS);
        assert_eq!(loaded.max_speed, MAX_SPEED);
    }
}
