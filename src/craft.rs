//! Craft kinematics and the input-intent pipeline.
//!
//! ## Pipeline (runs in order every `FixedUpdate` tick)
//!
//! 1. [`craft_intent_clear_system`]: resets [`CraftIntent`] to all-false.
//! 2. [`keyboard_to_intent_system`]: translates arrow/WASD/space keys into
//!    level-triggered intent booleans.
//! 3. [`craft_control_system`]: applies rotation (sticky-scaled when already
//!    aligned) and thrust to the craft.
//! 4. [`craft_integrate_system`]: friction, position integration, wrap.
//!
//! The **input abstraction layer** ([`CraftIntent`]) makes the guidance loop
//! fully testable: tests populate the resource directly and run only the
//! control/integrate systems.  Edge-triggering for the action button is *not*
//! derived here; the capture state machine owns that (`crate::capture`).

use crate::alignment::{assess, forward_from_heading};
use crate::config::GameConfig;
use crate::target::Beacon;
use bevy::prelude::*;

// ── Components ────────────────────────────────────────────────────────────────

/// Kinematic state of the player craft.
///
/// Positions live in playfield coordinates (`[0, field_width] ×
/// [0, field_height]`, y growing downward); the gizmo renderer projects them
/// into screen space when drawing.  Created once at game start at the field
/// centre, mutated every tick, never despawned during a session.
#[derive(Component, Debug, Clone)]
pub struct Craft {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading angle in radians. Unconstrained; wraps naturally via trig.
    pub heading: f32,
}

impl Craft {
    /// A craft at rest at the given position, nose pointing up.
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading,
        }
    }

    /// World-space forward unit vector (see
    /// [`forward_from_heading`] for the heading/nose offset contract).
    #[inline]
    pub fn forward(&self) -> Vec2 {
        forward_from_heading(self.heading)
    }

    /// Turn by `direction` (−1.0 = left, +1.0 = right) scaled by the rotation
    /// speed and a multiplier. `multiplier < 1.0` implements sticky precision
    /// aiming.
    pub fn rotate(&mut self, direction: f32, multiplier: f32, config: &GameConfig) {
        self.heading += direction * config.rotation_speed * multiplier;
    }

    /// Snap velocity to `forward * max_speed`.
    ///
    /// Thrust overrides velocity completely rather than accumulating: the
    /// craft flies a decaying coast between taps. Intentional flight model.
    pub fn thrust(&mut self, config: &GameConfig) {
        self.velocity = self.forward() * config.max_speed;
    }

    /// One tick of physics: apply friction, kill sub-epsilon creep, move,
    /// and wrap each axis independently (teleport wrap, not reflect).
    pub fn integrate(&mut self, config: &GameConfig) {
        self.velocity *= config.friction;

        if self.velocity.length() < config.stop_epsilon {
            self.velocity = Vec2::ZERO;
        }

        self.position += self.velocity;

        if self.position.x < 0.0 {
            self.position.x = config.field_width;
        }
        if self.position.x > config.field_width {
            self.position.x = 0.0;
        }
        if self.position.y < 0.0 {
            self.position.y = config.field_height;
        }
        if self.position.y > config.field_height {
            self.position.y = 0.0;
        }
    }
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// Level-triggered input booleans for the current tick.
///
/// Input systems write to this resource each tick after it is cleared; the
/// control and capture systems read it.  Tests can populate it directly to
/// drive craft behaviour without a real keyboard.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftIntent {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    /// Capture action. Level-triggered here; the capture state machine
    /// derives the press edge itself.
    pub action: bool,
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Reset [`CraftIntent`] at the start of every tick.
///
/// Must run before any system that writes to the intent.
pub fn craft_intent_clear_system(mut intent: ResMut<CraftIntent>) {
    *intent = CraftIntent::default();
}

/// Translate keyboard state into [`CraftIntent`].
///
/// - **←/A** → rotate left, **→/D** → rotate right
/// - **↑/W** → thrust
/// - **Space** → capture action
pub fn keyboard_to_intent_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut intent: ResMut<CraftIntent>,
) {
    if keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA) {
        intent.rotate_left = true;
    }
    if keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD) {
        intent.rotate_right = true;
    }
    if keys.pressed(KeyCode::ArrowUp) || keys.pressed(KeyCode::KeyW) {
        intent.thrust = true;
    }
    if keys.pressed(KeyCode::Space) {
        intent.action = true;
    }
}

/// Apply rotation and thrust intent to the craft.
///
/// The rotation multiplier is decided by a **pre-rotation** alignment check
/// against the craft's current pose: once roughly on target, turning slows to
/// `sticky_rotation_multiplier` so fine aiming is easier.  Deciding from the
/// pre-rotation pose is intentional; do not change it to use the
/// post-movement sample.
pub fn craft_control_system(
    intent: Res<CraftIntent>,
    config: Res<GameConfig>,
    mut q_craft: Query<&mut Craft>,
    q_beacon: Query<&Beacon>,
) {
    let Ok(mut craft) = q_craft.single_mut() else {
        return;
    };

    let multiplier = match q_beacon.single() {
        Ok(beacon) => {
            let pre = assess(craft.position, craft.forward(), beacon.position, &config);
            if pre.aligned {
                config.sticky_rotation_multiplier
            } else {
                1.0
            }
        }
        // No target: full-rate scanning.
        Err(_) => 1.0,
    };

    if intent.rotate_left {
        craft.rotate(-1.0, multiplier, &config);
    }
    if intent.rotate_right {
        craft.rotate(1.0, multiplier, &config);
    }
    if intent.thrust {
        craft.thrust(&config);
    }
}

/// Integrate craft physics for the tick (friction, movement, wrap).
pub fn craft_integrate_system(config: Res<GameConfig>, mut q_craft: Query<&mut Craft>) {
    let Ok(mut craft) = q_craft.single_mut() else {
        return;
    };
    craft.integrate(&config);
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Spawn the player craft at the centre of the playfield.
///
/// The craft carries no render components; drawing reads [`Craft`] directly.
pub fn spawn_craft(mut commands: Commands, config: Res<GameConfig>) {
    let centre = Vec2::new(config.field_width / 2.0, config.field_height / 2.0);
    commands.spawn(Craft::new(centre, crate::constants::INITIAL_HEADING));

    println!("✓ Craft spawned at field centre");
}

// ── Unit tests ────────────────────────────────────────────────────────────────
