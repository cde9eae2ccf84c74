//! Centralised gameplay and audio tuning constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every constant and can override any
//! subset at startup from `assets/settings.toml`.
//!
//! ## Tuning guidance
//!
//! The audio guidance loop is perceptually sensitive: pitch/gain ranges and
//! the alignment thresholds were tuned together against blind playtests.
//! Change one side and re-test the other.

// ── Playfield ─────────────────────────────────────────────────────────────────

/// Playfield width in world units (pixels). Fixed for a session; wrap-around
/// and target placement both use this, never the live window size.
pub const FIELD_WIDTH: f32 = 800.0;

/// Playfield height in world units (pixels).
pub const FIELD_HEIGHT: f32 = 600.0;

/// Margin kept between a freshly spawned target and the playfield edge, so
/// the beacon never sits half outside the wrap boundary.
pub const TARGET_SPAWN_MARGIN: f32 = 64.0;

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Fixed guidance-tick rate. All per-tick tuning values (rotation speed,
/// friction) are calibrated against this cadence.
pub const TICK_HZ: f64 = 60.0;

// ── Craft kinematics ──────────────────────────────────────────────────────────

/// Heading change per tick (radians) at full rotation input.
///
/// At 60 Hz this is ~103°/s. Higher values make coarse scanning faster but
/// fine aiming harder; the sticky multiplier below exists to offset that.
pub const ROTATION_SPEED: f32 = 0.03;

/// Rotation multiplier applied while the craft is already roughly aligned
/// with the target ("sticky" precision aiming). 1.0 disables stickiness.
pub const STICKY_ROTATION_MULTIPLIER: f32 = 0.25;

/// Speed the craft snaps to when thrusting (units/tick).
///
/// Thrust *sets* velocity to `forward * MAX_SPEED` rather than accumulating
/// acceleration: tap-thrust plus friction yields a decaying coast. This is
/// the intended flight model, not an integration shortcut.
pub const MAX_SPEED: f32 = 12.0;

/// Per-tick velocity retention factor. Velocity is multiplied by this every
/// tick, so the craft loses 70% of its speed per frame without thrust.
pub const FRICTION: f32 = 0.3;

/// Speeds below this are zeroed outright to stop sub-pixel perpetual creep.
pub const STOP_EPSILON: f32 = 0.05;

/// Craft heading at session start (radians). Points the nose up on screen.
pub const INITIAL_HEADING: f32 = -std::f32::consts::PI;

// ── Alignment model ───────────────────────────────────────────────────────────

/// Alignment dot-product threshold when the target is far away (strict).
pub const ALIGN_DOT_FAR: f32 = 0.995;

/// Alignment dot-product threshold when the target is close (forgiving).
///
/// Angular sensitivity grows as range shrinks; a fixed threshold would make
/// the last hundred pixels nearly impossible to stay aligned through, so the
/// bar relaxes linearly between [`ALIGN_NEAR_DIST`] and [`ALIGN_FAR_DIST`].
pub const ALIGN_DOT_NEAR: f32 = 0.970;

/// Distance at or below which the near (forgiving) threshold applies.
pub const ALIGN_NEAR_DIST: f32 = 120.0;

/// Distance at or above which the far (strict) threshold applies.
pub const ALIGN_FAR_DIST: f32 = 600.0;

// ── Capture ───────────────────────────────────────────────────────────────────

/// Maximum craft-to-target distance for a capture to succeed, and the radius
/// of the audible "in range" proximity feedback.
pub const CAPTURE_DISTANCE: f32 = 200.0;

/// Minimum interval between accepted capture attempts (ms). Presses inside
/// the window are silently dropped (a rate limit, not an error).
pub const CAPTURE_COOLDOWN_MS: u64 = 400;

/// Delay between the capture whoosh and the success chime (ms), so the two
/// cues read as a sequence rather than a single mush.
pub const CHIME_DELAY_MS: u64 = 200;

// ── Target lifecycle ──────────────────────────────────────────────────────────

/// How long a spawned target stays up before despawning on its own (ms).
pub const TARGET_ACTIVE_DURATION_MS: u64 = 8000;

// ── Guidance audio mapping ────────────────────────────────────────────────────

/// Beacon pitch when aimed directly away from the target (dot = −1).
pub const GUIDANCE_PITCH_LOW: f32 = 0.6;

/// Beacon pitch when aimed directly at the target (dot = +1).
pub const GUIDANCE_PITCH_HIGH: f32 = 1.6;

/// Beacon gain when aimed directly away from the target.
pub const GUIDANCE_GAIN_LOW: f32 = 0.04;

/// Beacon gain when aimed directly at the target.
pub const GUIDANCE_GAIN_HIGH: f32 = 0.14;

/// Pitch multiplier applied while inside capture range.
pub const RANGE_BOOST_PITCH: f32 = 1.12;

/// Gain multiplier applied while inside capture range.
pub const RANGE_BOOST_GAIN: f32 = 1.35;

/// Period of the in-range gain pulse (ms). The pulse is a raised cosine,
/// a smooth 0→1→0 breathing oscillation, never a hard on/off gate.
pub const RANGE_PULSE_PERIOD_MS: u64 = 650;

/// Depth of the in-range gain pulse. 0.0 = no pulse; 1.0 dips the gain to
/// zero at the trough.
pub const RANGE_PULSE_DEPTH: f32 = 0.35;

/// Accumulated unsigned heading change (radians) required before the aligned
/// ping may fire again. Rewards active scanning; dwelling motionless while
/// aligned never re-fires the cue.
pub const ALIGN_PING_ROTATION_BUDGET: f32 = 10.0 * std::f32::consts::PI / 180.0;

// ── Doppler ───────────────────────────────────────────────────────────────────

/// Minimum Δt (ms) used in the finite-difference listener velocity estimate;
/// guards the division when two samples land on the same millisecond.
pub const VELOCITY_MIN_DT_MS: u64 = 1;

/// Speed of sound (m/s) used by the device layer's Doppler shift.
pub const SPEED_OF_SOUND: f32 = 343.3;

/// Pixels → audio-world metres. 800 px ≈ 8 m keeps rolloff and Doppler in a
/// plausible range for the playfield size.
pub const AUDIO_WORLD_SCALE: f32 = 0.01;

/// Doppler shift is clamped to this factor either side of the base pitch so
/// a wrap-around teleport can never produce a screeching artifact.
pub const DOPPLER_SHIFT_LIMIT: f32 = 2.0;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Font size of the score HUD.
pub const HUD_FONT_SIZE: f32 = 18.0;

/// Radius of the target circle gizmo.
pub const TARGET_DRAW_RADIUS: f32 = 24.0;
