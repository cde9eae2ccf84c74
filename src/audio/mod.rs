//! The audio director: translates game state into spatial-audio parameters.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`backend`] | `Cue` enum, `AudioBackend` trait, queued production impl |
//! | [`output`] | Device layer: asset loading, spatial sinks, Doppler shift |
//!
//! The director owns **no gameplay state**: it is driven once per tick with
//! fresh craft/target/alignment inputs and keeps only the bookkeeping the
//! audio model itself needs: the last listener position sample (for the
//! finite-difference Doppler velocity), the rotation accumulator (for the
//! aligned-scan ping), the in-range edge flag, and the delayed-cue schedule.

pub mod backend;
pub mod output;

use crate::alignment::Alignment;
use crate::config::GameConfig;
use crate::constants::VELOCITY_MIN_DT_MS;
use crate::craft::Craft;
use crate::target::Beacon;
use crate::timing::Deadline;
use backend::{AudioBackend, AudioCommands, Cue};
use bevy::prelude::*;

/// Accumulated audio-model state. See the module docs for what belongs here
/// (and what deliberately does not).
#[derive(Resource, Debug, Default)]
pub struct AudioDirector {
    /// Last listener position sample, or `None` when no target is present.
    /// Cleared on target despawn so a fresh target never inherits a stale
    /// sample and reports a spurious velocity spike.
    last_listener_pos: Option<Vec2>,
    /// Wall-clock time of the last velocity sample (ms).
    last_sample_ms: u64,
    /// Heading at the last tick, for the rotation accumulator.
    last_heading: f32,
    /// Unsigned heading change accumulated since the aligned ping last fired.
    rotation_accumulator: f32,
    /// Whether the craft was inside capture range last tick (range-entry edge).
    was_in_range: bool,
    /// Delayed one-shot cue schedule.
    pending_cue: Option<Cue>,
    pending_at: Deadline,
}

impl AudioDirector {
    /// Schedule `cue` to fire once, `delay_ms` after `now_ms`. Replaces any
    /// previously pending schedule.
    pub fn schedule_cue(&mut self, cue: Cue, now_ms: u64, delay_ms: u64) {
        self.pending_cue = Some(cue);
        self.pending_at.arm(now_ms, delay_ms);
    }

    /// One audio tick. Pushes every parameter the backend needs for the
    /// current frame and fires whatever discrete cues are due.
    ///
    /// `alignment` is the post-movement sample for this tick; it is `Some`
    /// exactly when `beacon` is.
    pub fn update<B: AudioBackend>(
        &mut self,
        backend: &mut B,
        now_ms: u64,
        craft: &Craft,
        beacon: Option<&Beacon>,
        alignment: Option<&Alignment>,
        config: &GameConfig,
    ) {
        // Delayed cue first: it must fire on schedule even if the target
        // despawned in the meantime (the success chime outlives its target).
        if self.pending_at.fire_if_due(now_ms) {
            if let Some(cue) = self.pending_cue.take() {
                backend.play_oneshot(cue);
            }
        }

        let (Some(beacon), Some(alignment)) = (beacon, alignment) else {
            // No target: silence the loop and reset per-target tracking so
            // the next spawn starts from a clean slate.
            backend.set_loop_active(Cue::Beacon, false);
            self.last_listener_pos = None;
            self.last_sample_ms = 0;
            self.was_in_range = false;
            return;
        };

        backend.set_loop_active(Cue::Beacon, true);

        // Rotation accumulator (drives the aligned-scan ping).
        let mut delta = (craft.heading - self.last_heading).abs();
        if delta > std::f32::consts::PI {
            delta = std::f32::consts::TAU - delta;
        }
        self.rotation_accumulator += delta;
        self.last_heading = craft.heading;

        // Listener velocity: finite difference over wall-clock time. The
        // first tick after a spawn seeds the sample and reports zero; an
        // uninitialised "last position" must never difference into a spike.
        let velocity = match self.last_listener_pos {
            None => {
                self.last_listener_pos = Some(craft.position);
                self.last_sample_ms = now_ms;
                Vec2::ZERO
            }
            Some(last) => {
                let dt_ms = (now_ms - self.last_sample_ms).max(VELOCITY_MIN_DT_MS);
                let dt = dt_ms as f32 / 1000.0;
                let estimate = (craft.position - last) / dt;
                self.last_listener_pos = Some(craft.position);
                self.last_sample_ms = now_ms;
                estimate
            }
        };

        let forward = craft.forward();
        backend.set_listener(craft.position, forward, velocity);

        // Targets are stationary in this design; both target-located cues
        // sit at the beacon with zero velocity.
        backend.set_source(Cue::Beacon, beacon.position, Vec2::ZERO);
        backend.set_source(Cue::Ping, beacon.position, Vec2::ZERO);

        let in_range = alignment.distance <= config.capture_distance;

        // Range-entry cue: rising edge only.
        if in_range && !self.was_in_range {
            backend.play_oneshot(Cue::Ping);
        }
        self.was_in_range = in_range;

        // Continuous guidance: dot ∈ [-1, 1] → pitch and gain ramps. This is
        // the primary navigation signal for a player who cannot see.
        let t = (alignment.dot.clamp(-1.0, 1.0) + 1.0) / 2.0;
        let mut pitch =
            config.guidance_pitch_low + (config.guidance_pitch_high - config.guidance_pitch_low) * t;
        let mut gain =
            config.guidance_gain_low + (config.guidance_gain_high - config.guidance_gain_low) * t;

        // Proximity boost + smooth gain pulse while inside capture range.
        if in_range {
            pitch *= config.range_boost_pitch;
            gain *= config.range_boost_gain * range_pulse(now_ms, config);
        }

        backend.set_pitch(Cue::Beacon, pitch);
        backend.set_gain(Cue::Beacon, gain);

        // Aligned-scan ping: enough accumulated rotation AND currently
        // aligned. Dwelling motionless never re-fires; the accumulator only
        // grows from rotation.
        if self.rotation_accumulator > config.align_ping_rotation_budget && alignment.aligned {
            backend.play_oneshot(Cue::Ping);
            self.rotation_accumulator = 0.0;
        }
    }
}

/// Raised-cosine gain pulse factor for the in-range breathing effect.
///
/// `phase` sweeps the pulse period; the factor oscillates smoothly between
/// `1 - depth` and `1.0`, never a hard gate.
fn range_pulse(now_ms: u64, config: &GameConfig) -> f32 {
    let period = config.range_pulse_period_ms.max(1);
    let phase = (now_ms % period) as f32 / period as f32;
    let pulse = 0.5 - 0.5 * (std::f32::consts::TAU * phase).cos();
    (1.0 - config.range_pulse_depth) + config.range_pulse_depth * pulse
}

/// Per-tick driver: feeds the director the craft pose, beacon, and the
/// post-movement alignment sample.
pub fn audio_director_system(
    mut director: ResMut<AudioDirector>,
    mut commands_queue: ResMut<AudioCommands>,
    config: Res<GameConfig>,
    time: Res<Time>,
    sample: Res<crate::alignment::AlignmentSample>,
    q_craft: Query<&Craft>,
    q_beacon: Query<&Beacon>,
) {
    let Ok(craft) = q_craft.single() else {
        return;
    };
    let now_ms = time.elapsed().as_millis() as u64;
    let beacon = q_beacon.single().ok();

    director.update(
        &mut *commands_queue,
        now_ms,
        craft,
        beacon,
        sample.0.as_ref().filter(|_| beacon.is_some()),
        &config,
    );
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::backend::AudioCommand;
    use super::*;
    use crate::alignment::assess;

    fn craft_at(position: Vec2, heading: f32) -> Craft {
        Craft {
            position,
            velocity: Vec2::ZERO,
            heading,
        }
    }

    /// Run one director tick against a fresh command queue and return the
    /// emitted commands.
    fn tick(
        director: &mut AudioDirector,
        now_ms: u64,
        craft: &Craft,
        beacon: Option<&Beacon>,
        config: &GameConfig,
    ) -> Vec<AudioCommand> {
        let mut queue = AudioCommands::default();
        let alignment = beacon.map(|b| assess(craft.position, craft.forward(), b.position, config));
        director.update(&mut queue, now_ms, craft, beacon, alignment.as_ref(), config);
        queue.drain().collect()
    }

    fn listener_velocity(commands: &[AudioCommand]) -> Option<Vec2> {
        commands.iter().find_map(|c| match c {
            AudioCommand::Listener { velocity, .. } => Some(*velocity),
            _ => None,
        })
    }

    fn beacon_pitch(commands: &[AudioCommand]) -> Option<f32> {
        commands.iter().find_map(|c| match c {
            AudioCommand::Pitch {
                cue: Cue::Beacon,
                value,
            } => Some(*value),
            _ => None,
        })
    }

    fn beacon_gain(commands: &[AudioCommand]) -> Option<f32> {
        commands.iter().find_map(|c| match c {
            AudioCommand::Gain {
                cue: Cue::Beacon,
                value,
            } => Some(*value),
            _ => None,
        })
    }

    fn ping_count(commands: &[AudioCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::PlayOneShot { cue: Cue::Ping }))
            .count()
    }

    // ── Velocity estimation ───────────────────────────────────────────────────

    #[test]
    fn first_sample_after_spawn_reports_zero_velocity() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let beacon = Beacon {
            position: Vec2::new(700.0, 500.0),
        };

        // Craft far from the origin: would be a huge spike if differenced
        // against an uninitialised sample.
        let craft = craft_at(Vec2::new(400.0, 300.0), 0.0);
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);
        assert_eq!(listener_velocity(&commands), Some(Vec2::ZERO));
    }

    #[test]
    fn velocity_is_position_delta_over_seconds() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let beacon = Beacon {
            position: Vec2::new(700.0, 500.0),
        };

        let craft = craft_at(Vec2::ZERO, 0.0);
        tick(&mut director, 0, &craft, Some(&beacon), &config);

        let craft = craft_at(Vec2::new(10.0, 0.0), 0.0);
        let commands = tick(&mut director, 100, &craft, Some(&beacon), &config);

        let v = listener_velocity(&commands).unwrap();
        assert!((v.x - 100.0).abs() < 1e-3, "expected ~100 u/s, got {}", v.x);
        assert!(v.y.abs() < 1e-3);
    }

    #[test]
    fn target_absence_resets_the_velocity_sample() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let beacon = Beacon {
            position: Vec2::new(700.0, 500.0),
        };

        let craft = craft_at(Vec2::ZERO, 0.0);
        tick(&mut director, 0, &craft, Some(&beacon), &config);

        // Target despawns; craft teleport-wraps meanwhile.
        tick(&mut director, 50, &craft, None, &config);

        let craft = craft_at(Vec2::new(790.0, 0.0), 0.0);
        let commands = tick(&mut director, 100, &craft, Some(&beacon), &config);
        assert_eq!(
            listener_velocity(&commands),
            Some(Vec2::ZERO),
            "first sample after a reset must re-seed, not difference"
        );
    }

    #[test]
    fn zero_dt_is_clamped_not_divided() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let beacon = Beacon {
            position: Vec2::new(700.0, 500.0),
        };

        let craft = craft_at(Vec2::ZERO, 0.0);
        tick(&mut director, 0, &craft, Some(&beacon), &config);

        let craft = craft_at(Vec2::new(1.0, 0.0), 0.0);
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);
        let v = listener_velocity(&commands).unwrap();
        assert!(v.x.is_finite());
        // 1 px over the clamped 1 ms floor = 1000 u/s.
        assert!((v.x - 1000.0).abs() < 1e-2);
    }

    // ── Guidance mapping ──────────────────────────────────────────────────────

    #[test]
    fn dead_on_aim_maps_to_top_of_pitch_and_gain_ramps() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();

        // Beacon straight ahead, outside capture range (no boost).
        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);
        let beacon = Beacon {
            position: craft.position + craft.forward() * 500.0,
        };
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);

        let pitch = beacon_pitch(&commands).unwrap();
        let gain = beacon_gain(&commands).unwrap();
        assert!((pitch - config.guidance_pitch_high).abs() < 1e-3);
        assert!((gain - config.guidance_gain_high).abs() < 1e-3);
    }

    #[test]
    fn aimed_dead_away_maps_to_bottom_of_ramps() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();

        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);
        let beacon = Beacon {
            position: craft.position - craft.forward() * 500.0,
        };
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);

        assert!((beacon_pitch(&commands).unwrap() - config.guidance_pitch_low).abs() < 1e-3);
        assert!((beacon_gain(&commands).unwrap() - config.guidance_gain_low).abs() < 1e-3);
    }

    #[test]
    fn in_range_boost_raises_pitch() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();

        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);
        let beacon = Beacon {
            position: craft.position + craft.forward() * (config.capture_distance - 10.0),
        };
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);

        let expected = config.guidance_pitch_high * config.range_boost_pitch;
        assert!((beacon_pitch(&commands).unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn range_pulse_breathes_between_depth_floor_and_one() {
        let config = GameConfig::default();
        // Trough at phase 0, peak at half period.
        assert!((range_pulse(0, &config) - (1.0 - config.range_pulse_depth)).abs() < 1e-4);
        assert!((range_pulse(config.range_pulse_period_ms / 2, &config) - 1.0).abs() < 1e-3);

        for ms in (0..config.range_pulse_period_ms * 2).step_by(13) {
            let f = range_pulse(ms, &config);
            assert!(f >= 1.0 - config.range_pulse_depth - 1e-4 && f <= 1.0 + 1e-4);
        }
    }

    // ── Discrete cues ─────────────────────────────────────────────────────────

    #[test]
    fn range_entry_ping_fires_on_rising_edge_only() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);

        let far = Beacon {
            position: craft.position + craft.forward() * 400.0,
        };
        let near = Beacon {
            position: craft.position + craft.forward() * 100.0,
        };

        let commands = tick(&mut director, 0, &craft, Some(&far), &config);
        assert_eq!(ping_count(&commands), 0);

        // Entering range: exactly one ping.
        let commands = tick(&mut director, 16, &craft, Some(&near), &config);
        assert_eq!(ping_count(&commands), 1);

        // Still in range: no re-fire.
        let commands = tick(&mut director, 33, &craft, Some(&near), &config);
        assert_eq!(ping_count(&commands), 0);

        // Leave and re-enter: fires again.
        tick(&mut director, 50, &craft, Some(&far), &config);
        let commands = tick(&mut director, 66, &craft, Some(&near), &config);
        assert_eq!(ping_count(&commands), 1);
    }

    #[test]
    fn aligned_ping_requires_rotation_budget_and_alignment() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();

        // Beacon 90° off to the side at a side-range distance, craft slowly
        // rotating toward it. Start misaligned.
        let position = Vec2::new(100.0, 100.0);
        let beacon = Beacon {
            position: position + Vec2::new(300.0, 0.0),
        };

        // Heading such that forward = +X means aligned: forward angle 0 ⇒
        // heading = −π/2.
        let aligned_heading = -std::f32::consts::FRAC_PI_2;

        // Tick 0 establishes last_heading while far from aligned.
        let craft = craft_at(position, aligned_heading + 1.0);
        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);
        let baseline = ping_count(&commands); // range-entry does not apply (distance 300 > 200)
        assert_eq!(baseline, 0);

        // Swing onto the target: >10° of accumulated rotation, now aligned.
        let craft = craft_at(position, aligned_heading);
        let commands = tick(&mut director, 16, &craft, Some(&beacon), &config);
        assert_eq!(ping_count(&commands), 1, "scan onto target should ping");

        // Dwelling aligned with zero rotation: accumulator stays empty.
        let commands = tick(&mut director, 33, &craft, Some(&beacon), &config);
        assert_eq!(ping_count(&commands), 0, "no rotation, no re-fire");
    }

    #[test]
    fn rotation_alone_without_alignment_never_pings() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let position = Vec2::new(100.0, 100.0);
        let beacon = Beacon {
            position: position + Vec2::new(300.0, 0.0),
        };

        // Spin in place far from alignment.
        let mut heading = 1.0;
        for i in 0..40 {
            let craft = craft_at(position, heading);
            let commands = tick(&mut director, i * 16, &craft, Some(&beacon), &config);
            assert_eq!(ping_count(&commands), 0);
            heading += 0.05;
            // Keep the pose pointed away from the beacon throughout.
            assert!(heading < std::f32::consts::PI);
        }
    }

    // ── Delayed cue ───────────────────────────────────────────────────────────

    #[test]
    fn delayed_cue_fires_once_at_or_after_deadline() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);

        director.schedule_cue(Cue::Chime, 1000, 200);

        let chimes = |commands: &[AudioCommand]| {
            commands
                .iter()
                .filter(|c| matches!(c, AudioCommand::PlayOneShot { cue: Cue::Chime }))
                .count()
        };

        // Before the deadline: nothing. (Target absent; the chime must fire
        // regardless of target state.)
        let commands = tick(&mut director, 1100, &craft, None, &config);
        assert_eq!(chimes(&commands), 0);

        let commands = tick(&mut director, 1200, &craft, None, &config);
        assert_eq!(chimes(&commands), 1);

        // Schedule cleared after firing.
        let commands = tick(&mut director, 1300, &craft, None, &config);
        assert_eq!(chimes(&commands), 0);
    }

    // ── Ambient loop ──────────────────────────────────────────────────────────

    #[test]
    fn beacon_loop_tracks_target_presence() {
        let config = GameConfig::default();
        let mut director = AudioDirector::default();
        let craft = craft_at(Vec2::new(100.0, 100.0), 0.0);
        let beacon = Beacon {
            position: Vec2::new(600.0, 400.0),
        };

        let commands = tick(&mut director, 0, &craft, Some(&beacon), &config);
        assert!(commands.contains(&AudioCommand::LoopActive {
            cue: Cue::Beacon,
            active: true
        }));

        let commands = tick(&mut director, 16, &craft, None, &config);
        assert!(commands.contains(&AudioCommand::LoopActive {
            cue: Cue::Beacon,
            active: false
        }));
    }
}
