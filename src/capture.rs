//! Edge-triggered capture handling: cooldown, attempt evaluation, scoring,
//! and the whoosh/chime cue sequence.
//!
//! The capture machine consumes the level-triggered action boolean each tick
//! and derives the press edge itself; holding the key is one attempt.  An
//! accepted attempt always has audible feedback (the whoosh plays on a miss
//! too), while a press inside the cooldown window is dropped silently, a
//! deliberate rate limit, not an error.

use crate::alignment::{Alignment, AlignmentSample};
use crate::audio::backend::{AudioBackend, AudioCommands, Cue};
use crate::audio::AudioDirector;
use crate::config::GameConfig;
use crate::craft::CraftIntent;
use crate::target::{Target, TargetLifecycle};
use crate::timing::Deadline;
use bevy::prelude::*;

// ── Outcome model ─────────────────────────────────────────────────────────────

/// Structured observability payload for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissReport {
    pub aligned: bool,
    pub close_enough: bool,
    pub dot: f32,
    pub distance: f32,
    pub threshold: f32,
}

/// Result of feeding one tick's action state to the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// No press edge this tick, or a press with no target up (defined
    /// no-effect outcome, not an error).
    Idle,
    /// Press edge arrived inside the cooldown window; dropped silently.
    CoolingDown,
    /// Accepted attempt that failed the aligned-and-close check.
    Missed(MissReport),
    /// Accepted attempt that captured the target.
    Captured,
}

// ── State machine ─────────────────────────────────────────────────────────────

/// Capture state: press-edge memory, cooldown gate, and score.
#[derive(Resource, Debug, Default)]
pub struct CaptureState {
    previous_action: bool,
    /// Cooldown gate: armed on every accepted attempt; attempts are eligible
    /// again once it comes due.
    cooldown: Deadline,
    score: u64,
}

impl CaptureState {
    /// Captures so far this session.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Process one tick of action input against the current (post-movement)
    /// alignment sample. `alignment` is `None` while no target is present.
    ///
    /// The press-edge memory updates on **every** call, whatever the
    /// outcome; releasing and re-pressing is the only way to produce a new
    /// attempt.
    pub fn handle_action(
        &mut self,
        now_ms: u64,
        action_pressed: bool,
        alignment: Option<&Alignment>,
        config: &GameConfig,
    ) -> CaptureOutcome {
        let just_pressed = action_pressed && !self.previous_action;
        self.previous_action = action_pressed;

        if !just_pressed {
            return CaptureOutcome::Idle;
        }

        // No target up: the press is consumed but costs nothing, not even
        // the cooldown.
        let Some(alignment) = alignment else {
            return CaptureOutcome::Idle;
        };

        if self.cooldown.pending() && !self.cooldown.is_due(now_ms) {
            return CaptureOutcome::CoolingDown;
        }
        self.cooldown.arm(now_ms, config.capture_cooldown_ms);

        let close_enough = alignment.distance <= config.capture_distance;
        if alignment.aligned && close_enough {
            self.score += 1;
            CaptureOutcome::Captured
        } else {
            CaptureOutcome::Missed(MissReport {
                aligned: alignment.aligned,
                close_enough,
                dot: alignment.dot,
                distance: alignment.distance,
                threshold: alignment.threshold,
            })
        }
    }
}

// ── System ────────────────────────────────────────────────────────────────────

/// Run the capture machine at the end of each tick and wire its outcome into
/// audio and the target lifecycle.
///
/// - Accepted attempt → immediate whoosh (hit or miss).
/// - Capture → despawn the target now, schedule the chime for
///   `chime_delay_ms` from now, log the score.
/// - Miss → structured diagnostic log, nothing else.
pub fn capture_system(
    mut commands: Commands,
    mut state: ResMut<CaptureState>,
    mut lifecycle: ResMut<TargetLifecycle>,
    mut director: ResMut<AudioDirector>,
    mut audio: ResMut<AudioCommands>,
    intent: Res<CraftIntent>,
    sample: Res<AlignmentSample>,
    config: Res<GameConfig>,
    time: Res<Time>,
    q_targets: Query<Entity, With<Target>>,
) {
    let now_ms = time.elapsed().as_millis() as u64;
    let alignment = if lifecycle.is_active() {
        sample.0
    } else {
        None
    };

    match state.handle_action(now_ms, intent.action, alignment.as_ref(), &config) {
        CaptureOutcome::Idle | CaptureOutcome::CoolingDown => {}
        CaptureOutcome::Missed(report) => {
            audio.play_oneshot(Cue::Whoosh);
            info!(
                "missed capture: aligned={} close={} dot={:.3} dist={:.1} threshold={:.3}",
                report.aligned, report.close_enough, report.dot, report.distance, report.threshold
            );
        }
        CaptureOutcome::Captured => {
            audio.play_oneshot(Cue::Whoosh);
            director.schedule_cue(Cue::Chime, now_ms, config.chime_delay_ms);

            lifecycle.request_despawn();
            for entity in q_targets.iter() {
                commands.entity(entity).despawn();
            }

            info!("captured! score = {}", state.score());
        }
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
