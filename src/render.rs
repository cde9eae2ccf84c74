//! Rendering systems: gizmo playfield overlay and the score/guidance HUD.
//!
//! The game is designed to be playable by ear; everything drawn here is a
//! sighted-player aid and a debugging surface, not gameplay.  The craft,
//! target, and capture ring render as per-frame gizmos (the scene is a
//! handful of primitives, retained meshes would be overkill), the HUD is
//! Bevy UI text.
//!
//! Playfield coordinates are y-down (screen convention); every drawn point
//! goes through [`playfield_to_screen`] on its way to the y-up camera.
//!
//! | System                        | Schedule | Purpose                         |
//! |-------------------------------|----------|---------------------------------|
//! | `setup_hud`                   | Startup  | Spawn score + guidance text     |
//! | `hud_score_display_system`    | Update   | Refresh score text              |
//! | `hud_guidance_display_system` | Update   | Refresh dot/threshold readout   |
//! | `render_toggle_system`        | Update   | F1 toggles the guidance line    |
//! | `gizmo_rendering_system`      | Update   | Draw craft, target, overlays    |

use crate::alignment::AlignmentSample;
use crate::capture::CaptureState;
use crate::config::GameConfig;
use crate::craft::Craft;
use crate::target::Target;
use bevy::prelude::*;

// ── Screen projection ─────────────────────────────────────────────────────────

/// Map a playfield point (y grows downward) into render space (y grows
/// upward), so thrusting "up" moves the craft toward the top of the window
/// and a rightward turn reads clockwise.
#[inline]
pub fn playfield_to_screen(point: Vec2, field_height: f32) -> Vec2 {
    Vec2::new(point.x, field_height - point.y)
}

// ── Overlay state resource ────────────────────────────────────────────────────

/// Debug overlay flags, toggled at runtime.
#[derive(Resource, Clone, Debug, Default)]
pub struct RenderToggles {
    /// Draw the craft→target line (F1).
    pub show_guidance_line: bool,
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Marker for the score HUD node.
#[derive(Component)]
pub struct HudScoreDisplay;

/// Marker for the alignment-readout HUD node.
#[derive(Component)]
pub struct HudGuidanceDisplay;

// ── Startup: HUD ──────────────────────────────────────────────────────────────

/// Spawn the permanent top-left HUD: score line plus a live alignment readout
/// underneath it.
pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudScoreDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Score: 0"),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0 + config.hud_font_size + 6.0),
                ..default()
            },
            HudGuidanceDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("no target"),
                TextFont {
                    font_size: config.hud_font_size * 0.75,
                    ..default()
                },
                TextColor(Color::srgb(0.0, 1.0, 1.0)),
            ));
        });
}

// ── Update: HUD text ──────────────────────────────────────────────────────────

/// Refresh the score HUD when the capture state changes.
pub fn hud_score_display_system(
    state: Res<CaptureState>,
    parent_query: Query<&Children, With<HudScoreDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    if !state.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(format!("Score: {}", state.score()));
            }
        }
    }
}

/// Refresh the alignment readout each frame.
pub fn hud_guidance_display_system(
    sample: Res<AlignmentSample>,
    parent_query: Query<&Children, With<HudGuidanceDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    let line = match sample.0 {
        Some(a) => format!(
            "dot {:+.3} / need {:.3} | dist {:.0}{}",
            a.dot,
            a.threshold,
            a.distance,
            if a.aligned { " | ALIGNED" } else { "" }
        ),
        None => "no target".to_string(),
    };
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(line.clone());
            }
        }
    }
}

// ── Update: overlay toggles ───────────────────────────────────────────────────

/// F1 flips the guidance-line overlay.
pub fn render_toggle_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut toggles: ResMut<RenderToggles>,
) {
    if keys.just_pressed(KeyCode::F1) {
        toggles.show_guidance_line = !toggles.show_guidance_line;
        info!(
            "guidance line overlay {}",
            if toggles.show_guidance_line { "on" } else { "off" }
        );
    }
}

// ── Update: gizmo rendering ───────────────────────────────────────────────────

/// Draw the playfield each frame: craft triangle with a nose indicator, the
/// target with its capture ring, and (when toggled) the craft→target line.
///
/// The nose indicator turns green while the craft is aligned: the visual
/// twin of the audio guidance ramp.
pub fn gizmo_rendering_system(
    mut gizmos: Gizmos,
    q_craft: Query<&Craft>,
    q_targets: Query<&Target>,
    sample: Res<AlignmentSample>,
    config: Res<GameConfig>,
    toggles: Res<RenderToggles>,
) {
    let Ok(craft) = q_craft.single() else {
        return;
    };

    let project = |p: Vec2| playfield_to_screen(p, config.field_height);

    let pos = craft.position;
    let forward = craft.forward();
    let side = Vec2::new(forward.y, -forward.x);

    // Craft hull.
    let nose = pos + forward * 14.0;
    let tail_left = pos - forward * 10.0 + side * 8.0;
    let tail_right = pos - forward * 10.0 - side * 8.0;
    let hull = Color::srgb(0.85, 0.85, 0.88);
    gizmos.line_2d(project(nose), project(tail_left), hull);
    gizmos.line_2d(project(tail_left), project(tail_right), hull);
    gizmos.line_2d(project(tail_right), project(nose), hull);

    // Nose indicator.
    let aligned = sample.0.map(|a| a.aligned).unwrap_or(false);
    let indicator = if aligned {
        Color::srgb(0.2, 1.0, 0.3)
    } else {
        Color::srgb(1.0, 1.0, 1.0)
    };
    gizmos.line_2d(project(nose), project(nose + forward * 10.0), indicator);

    for target in q_targets.iter() {
        gizmos.circle_2d(
            project(target.position),
            config.target_draw_radius,
            Color::srgb(1.0, 0.55, 0.15),
        );
        gizmos.circle_2d(
            project(target.position),
            config.capture_distance,
            Color::srgba(1.0, 0.55, 0.15, 0.25),
        );

        if toggles.show_guidance_line {
            gizmos.line_2d(
                project(pos),
                project(target.position),
                Color::srgba(0.2, 0.8, 1.0, 0.6),
            );
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::forward_from_heading;
    use crate::constants::INITIAL_HEADING;

    #[test]
    fn corners_project_to_corners() {
        let h = 600.0;
        assert_eq!(
            playfield_to_screen(Vec2::new(0.0, 0.0), h),
            Vec2::new(0.0, 600.0)
        );
        assert_eq!(
            playfield_to_screen(Vec2::new(800.0, 600.0), h),
            Vec2::new(800.0, 0.0)
        );
    }

    #[test]
    fn start_pose_draws_the_nose_toward_the_top_of_the_window() {
        let config = GameConfig::default();
        let pos = Vec2::new(config.field_width / 2.0, config.field_height / 2.0);
        let nose = pos + forward_from_heading(INITIAL_HEADING) * 14.0;

        let screen_pos = playfield_to_screen(pos, config.field_height);
        let screen_nose = playfield_to_screen(nose, config.field_height);
        assert!((screen_nose.x - screen_pos.x).abs() < 1e-4);
        assert!(
            screen_nose.y > screen_pos.y,
            "the nose must render above the hull"
        );
    }

    #[test]
    fn rightward_turn_reads_clockwise_on_screen() {
        let config = GameConfig::default();
        let pos = Vec2::new(400.0, 300.0);
        let turned = INITIAL_HEADING + config.rotation_speed;
        let nose = pos + forward_from_heading(turned) * 14.0;

        let delta = playfield_to_screen(nose, config.field_height)
            - playfield_to_screen(pos, config.field_height);
        assert!(delta.x > 0.0, "a rightward turn must tilt the nose right");
        assert!(delta.y > 0.0, "a small turn keeps the nose mostly upward");
    }
}
