//! Target lifecycle: at most one active target, spawned at a random in-bounds
//! position and despawned on a fixed timer or on explicit capture.
//!
//! The target entity carries two components: [`Target`] (the gameplay/visual
//! identity) and [`Beacon`] (the audio identity).  They are always created and
//! destroyed together at the same position; keeping them separate lets the
//! audio subsystem query only beacon data and stay decoupled from the visual
//! representation.

use crate::config::GameConfig;
use crate::timing::Deadline;
use bevy::prelude::*;
use rand::Rng;

// ── Components ────────────────────────────────────────────────────────────────

/// The capturable target.
#[derive(Component, Debug, Clone, Copy)]
pub struct Target {
    pub position: Vec2,
}

/// Audio-only proxy co-located with the target. Sound systems depend on this,
/// never on [`Target`].
#[derive(Component, Debug, Clone, Copy)]
pub struct Beacon {
    pub position: Vec2,
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// What the lifecycle decided to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    /// Create a target + beacon at the given position.
    Spawn(Vec2),
    /// The active window elapsed; remove the target + beacon.
    Expire,
}

/// Two-state (Inactive/Active) lifecycle driver for the single target.
///
/// `plan_tick` holds the full state-machine logic and is pure over the
/// injected clock and RNG; [`target_lifecycle_system`] translates its
/// decisions into entity commands.
#[derive(Resource, Debug, Default)]
pub struct TargetLifecycle {
    active: bool,
    expiry: Deadline,
}

impl TargetLifecycle {
    /// Whether a target is currently present.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the state machine one tick.
    ///
    /// Inactive → spawn immediately (there is never a gap without a target);
    /// Active → expire once the active-duration deadline passes.
    pub fn plan_tick<R: Rng>(
        &mut self,
        now_ms: u64,
        rng: &mut R,
        config: &GameConfig,
    ) -> Option<LifecycleEvent> {
        if !self.active {
            let position = random_target_position(rng, config);
            self.active = true;
            self.expiry.arm(now_ms, config.target_active_duration_ms);
            return Some(LifecycleEvent::Spawn(position));
        }

        if self.expiry.fire_if_due(now_ms) {
            self.active = false;
            return Some(LifecycleEvent::Expire);
        }

        None
    }

    /// Explicit despawn (successful capture): back to Inactive immediately,
    /// bypassing the duration timer. The next `plan_tick` spawns afresh.
    pub fn request_despawn(&mut self) {
        self.active = false;
        self.expiry.clear();
    }
}

/// Pick a pseudo-random in-bounds target position.
///
/// The margin keeps the beacon clear of the wrap boundary so its sprite and
/// sound never straddle an edge.
pub fn random_target_position<R: Rng>(rng: &mut R, config: &GameConfig) -> Vec2 {
    Vec2::new(
        rng.gen_range(0.0..config.field_width - config.target_spawn_margin),
        rng.gen_range(0.0..config.field_height - config.target_spawn_margin),
    )
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Drive the lifecycle each tick: spawn a fresh target when none is active,
/// expire the current one when its window elapses.
pub fn target_lifecycle_system(
    mut commands: Commands,
    mut lifecycle: ResMut<TargetLifecycle>,
    config: Res<GameConfig>,
    time: Res<Time>,
    q_targets: Query<Entity, With<Target>>,
) {
    let now_ms = time.elapsed().as_millis() as u64;
    let mut rng = rand::thread_rng();

    match lifecycle.plan_tick(now_ms, &mut rng, &config) {
        Some(LifecycleEvent::Spawn(position)) => {
            commands.spawn((Target { position }, Beacon { position }));
            debug!("target spawned at ({:.0}, {:.0})", position.x, position.y);
        }
        Some(LifecycleEvent::Expire) => {
            for entity in q_targets.iter() {
                commands.entity(entity).despawn();
            }
            debug!("target expired");
        }
        None => {}
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
