//! Device layer: turns queued [`AudioCommand`]s into actual bevy_audio
//! playback.
//!
//! The guidance tick runs at a fixed cadence and never blocks on the device;
//! sinks are created asynchronously by bevy_audio once their source asset is
//! decoded.  This layer bridges the two by folding commands into a persistent
//! desired-state resource ([`AudioChannelState`]) and re-applying that state
//! to the sink every frame.  A command that arrives before the sink exists is
//! therefore never lost.
//!
//! Doppler shift is computed here rather than in the director: it is a
//! rendering concern of the device, derived from the listener/source poses the
//! director already pushes.
//!
//! Setting `EARSHOT_SILENT` in the environment disables the device layer
//! entirely (no asset loads, no sinks).  Headless runs and CI use this.

use crate::audio::backend::{AudioCommand, AudioCommands, Cue};
use crate::constants::{AUDIO_WORLD_SCALE, DOPPLER_SHIFT_LIMIT, SPEED_OF_SOUND};
use crate::error::GameError;
use bevy::asset::LoadState;
use bevy::audio::{PlaybackMode, PlaybackSettings, SpatialAudioSink, Volume};
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

// ── Resources and markers ─────────────────────────────────────────────────────

/// Whether audio output is disabled (`EARSHOT_SILENT` set).
#[derive(Resource, Debug, Clone, Copy)]
pub struct AudioMuted(pub bool);

/// Handles for every cue sample, loaded once at startup.
#[derive(Resource, Debug)]
pub struct CueAssets {
    handles: HashMap<Cue, Handle<AudioSource>>,
    verified: bool,
}

impl CueAssets {
    pub fn handle(&self, cue: Cue) -> Handle<AudioSource> {
        self.handles[&cue].clone()
    }
}

/// Desired playback state, folded from the command queue and re-applied to
/// the device every frame.
#[derive(Resource, Debug)]
pub struct AudioChannelState {
    pub listener_position: Vec2,
    pub listener_forward: Vec2,
    pub listener_velocity: Vec2,
    pub beacon_position: Vec2,
    pub beacon_velocity: Vec2,
    pub ping_position: Vec2,
    pub beacon_pitch: f32,
    pub beacon_gain: f32,
    pub loop_active: bool,
}

impl Default for AudioChannelState {
    fn default() -> Self {
        Self {
            listener_position: Vec2::ZERO,
            listener_forward: Vec2::Y,
            listener_velocity: Vec2::ZERO,
            beacon_position: Vec2::ZERO,
            beacon_velocity: Vec2::ZERO,
            ping_position: Vec2::ZERO,
            beacon_pitch: 1.0,
            beacon_gain: 0.0,
            loop_active: false,
        }
    }
}

impl AudioChannelState {
    /// Fold one command into the desired state. Parameter commands mutate the
    /// state; `PlayOneShot` passes through as the cue to trigger now.
    pub fn apply(&mut self, command: AudioCommand) -> Option<Cue> {
        match command {
            AudioCommand::Listener {
                position,
                forward,
                velocity,
            } => {
                self.listener_position = position;
                self.listener_forward = forward;
                self.listener_velocity = velocity;
            }
            AudioCommand::Source {
                cue: Cue::Beacon,
                position,
                velocity,
            } => {
                self.beacon_position = position;
                self.beacon_velocity = velocity;
            }
            AudioCommand::Source { cue: Cue::Ping, position, .. } => {
                self.ping_position = position;
            }
            // Whoosh and chime are non-spatial; a pose for them is ignored.
            AudioCommand::Source { .. } => {}
            AudioCommand::Pitch {
                cue: Cue::Beacon,
                value,
            } => self.beacon_pitch = value,
            AudioCommand::Gain {
                cue: Cue::Beacon,
                value,
            } => self.beacon_gain = value,
            // Only the beacon channel carries continuous parameters.
            AudioCommand::Pitch { .. } | AudioCommand::Gain { .. } => {}
            AudioCommand::PlayOneShot { cue } => return Some(cue),
            AudioCommand::LoopActive {
                cue: Cue::Beacon,
                active,
            } => self.loop_active = active,
            AudioCommand::LoopActive { .. } => {}
        }
        None
    }
}

/// Marker for the looping beacon channel entity.
#[derive(Component)]
pub struct BeaconChannel;

/// Marker for the spatial listener rig entity.
#[derive(Component)]
pub struct ListenerRig;

// ── Audio space ───────────────────────────────────────────────────────────────

/// Map a playfield point (y grows downward) into the y-up, metre-scaled space
/// the spatial mixer works in. Same flip as the renderer, so left/right
/// panning matches the screen.
#[inline]
fn audio_space(point: Vec2) -> Vec3 {
    Vec3::new(point.x, -point.y, 0.0) * AUDIO_WORLD_SCALE
}

/// Listener rig rotation for a playfield forward vector. Local +Y is the
/// craft's nose, so the ears sit on ±X.
#[inline]
fn listener_rotation(forward: Vec2) -> Quat {
    let facing = (-forward.y).atan2(forward.x);
    Quat::from_rotation_z(facing - std::f32::consts::FRAC_PI_2)
}

// ── Doppler ───────────────────────────────────────────────────────────────────

/// Doppler frequency ratio for a listener/source pair.
///
/// Velocities are in playfield units per second and get scaled to metres per
/// second before entering the classic `(c + v_l) / (c - v_s)` ratio, where
/// `v_l` is the listener's speed toward the source and `v_s` the source's
/// speed toward the listener.  The result is clamped to
/// `[1/DOPPLER_SHIFT_LIMIT, DOPPLER_SHIFT_LIMIT]` so numerically extreme
/// poses (teleport wrap, spawn frames) can never screech.
pub fn doppler_shift(
    listener_position: Vec2,
    listener_velocity: Vec2,
    source_position: Vec2,
    source_velocity: Vec2,
) -> f32 {
    let offset = source_position - listener_position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return 1.0;
    }
    let toward_source = offset / distance;

    let v_listener = AUDIO_WORLD_SCALE * listener_velocity.dot(toward_source);
    let v_source = AUDIO_WORLD_SCALE * -source_velocity.dot(toward_source);

    let denominator = (SPEED_OF_SOUND - v_source).max(f32::EPSILON);
    let shift = (SPEED_OF_SOUND + v_listener) / denominator;
    shift.clamp(1.0 / DOPPLER_SHIFT_LIMIT, DOPPLER_SHIFT_LIMIT)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup: load cue samples and spawn the listener rig and the (paused)
/// beacon loop channel. Does nothing when `EARSHOT_SILENT` is set.
pub fn setup_audio_output(mut commands: Commands, asset_server: Res<AssetServer>) {
    let muted = std::env::var("EARSHOT_SILENT").is_ok();
    commands.insert_resource(AudioMuted(muted));
    commands.init_resource::<AudioChannelState>();
    if muted {
        println!("ℹ EARSHOT_SILENT set; audio output disabled");
        return;
    }

    let mut handles = HashMap::new();
    for cue in Cue::ALL {
        handles.insert(cue, asset_server.load::<AudioSource>(cue.asset_path()));
    }
    let assets = CueAssets {
        handles,
        verified: false,
    };

    commands.spawn((
        ListenerRig,
        SpatialListener::new(0.2),
        Transform::default(),
    ));

    // The loop channel starts paused; the director's LoopActive commands
    // govern playback from the first tick on.
    commands.spawn((
        BeaconChannel,
        AudioPlayer::new(assets.handle(Cue::Beacon)),
        PlaybackSettings {
            mode: PlaybackMode::Loop,
            spatial: true,
            paused: true,
            ..default()
        },
        Transform::default(),
    ));

    commands.insert_resource(assets);
    println!("✓ Audio output initialised ({} cues loading)", Cue::ALL.len());
}

/// Fail fast on broken audio: a game that cannot be heard cannot be played.
/// Exits with an error code the first time any cue sample fails to decode,
/// and logs a confirmation once all cues are in.
pub fn audio_asset_watchdog_system(
    asset_server: Res<AssetServer>,
    assets: Option<ResMut<CueAssets>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(mut assets) = assets else {
        return;
    };
    if assets.verified {
        return;
    }

    let mut all_loaded = true;
    for cue in Cue::ALL {
        let handle = assets.handle(cue);
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Failed(err)) => {
                let failure = GameError::AudioAssetFailed {
                    path: cue.asset_path().to_string(),
                    reason: err.to_string(),
                };
                error!("{failure}");
                exit.write(AppExit::error());
                return;
            }
            Some(LoadState::Loaded) => {}
            _ => all_loaded = false,
        }
    }

    if all_loaded {
        assets.verified = true;
        println!("✓ All {} audio cues loaded", Cue::ALL.len());
    }
}

/// Drain the tick's command queue into the desired state and spawn one-shot
/// playback entities.
///
/// One-shots are fire-and-forget entities that despawn when playback ends.
/// The ping is spatial (it localises the target); whoosh and chime are plain
/// stereo feedback.
pub fn apply_audio_commands_system(
    mut commands: Commands,
    mut queue: ResMut<AudioCommands>,
    mut state: ResMut<AudioChannelState>,
    assets: Option<Res<CueAssets>>,
    muted: Res<AudioMuted>,
) {
    for command in queue.drain() {
        let Some(cue) = state.apply(command) else {
            continue;
        };
        if muted.0 {
            continue;
        }
        let Some(assets) = assets.as_ref() else {
            continue;
        };

        let settings = PlaybackSettings {
            mode: PlaybackMode::Despawn,
            spatial: cue == Cue::Ping,
            ..default()
        };
        let mut entity = commands.spawn((AudioPlayer::new(assets.handle(cue)), settings));
        if cue == Cue::Ping {
            entity.insert(Transform::from_translation(audio_space(state.ping_position)));
        }
    }
}

/// Re-apply the desired state to the device every frame.
///
/// Idempotent by construction: the beacon sink may not exist yet (asset still
/// decoding) or ever (muted run), and every branch tolerates that.
pub fn sync_audio_device_system(
    state: Res<AudioChannelState>,
    muted: Res<AudioMuted>,
    mut q_listener: Query<&mut Transform, (With<ListenerRig>, Without<BeaconChannel>)>,
    mut q_beacon: Query<(&mut Transform, Option<&mut SpatialAudioSink>), With<BeaconChannel>>,
) {
    if muted.0 {
        return;
    }

    if let Ok(mut transform) = q_listener.single_mut() {
        transform.translation = audio_space(state.listener_position);
        transform.rotation = listener_rotation(state.listener_forward);
    }

    let Ok((mut transform, sink)) = q_beacon.single_mut() else {
        return;
    };
    transform.translation = audio_space(state.beacon_position);

    let Some(mut sink) = sink else {
        return;
    };

    let shift = doppler_shift(
        state.listener_position,
        state.listener_velocity,
        state.beacon_position,
        state.beacon_velocity,
    );
    sink.set_speed(state.beacon_pitch * shift);
    sink.set_volume(Volume::Linear(state.beacon_gain));

    if state.loop_active {
        if sink.is_paused() {
            sink.play();
        }
    } else if !sink.is_paused() {
        sink.pause();
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
