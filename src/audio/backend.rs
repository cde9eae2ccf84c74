//! The audio backend boundary: what the guidance core pushes to a device.
//!
//! The director never talks to audio hardware directly.  It emits parameter
//! updates and cue triggers through [`AudioBackend`]; the production
//! implementation ([`AudioCommands`]) queues them for the device layer
//! (`super::output`) to apply, and tests inspect the queue directly.
//!
//! Cues are a closed enumeration rather than string identifiers: an unknown
//! cue is a compile-time-impossible state, not a runtime no-op.

use bevy::prelude::*;

/// The game's logical audio channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Continuous spatial guidance tone at the target. Looping.
    Beacon,
    /// One-shot spatial ping: fires on range entry and on aligned scanning.
    Ping,
    /// One-shot capture-attempt feedback. Plays on every accepted attempt,
    /// hit or miss.
    Whoosh,
    /// One-shot success chime, scheduled shortly after the whoosh.
    Chime,
}

impl Cue {
    /// Every cue, in asset-loading order.
    pub const ALL: [Cue; 4] = [Cue::Beacon, Cue::Ping, Cue::Whoosh, Cue::Chime];

    /// Asset path of this cue's sample (16-bit mono PCM WAV).
    pub fn asset_path(self) -> &'static str {
        match self {
            Cue::Beacon => "audio/beacon.wav",
            Cue::Ping => "audio/ping.wav",
            Cue::Whoosh => "audio/whoosh.wav",
            Cue::Chime => "audio/chime.wav",
        }
    }

    /// Whether this cue plays as a continuous loop.
    pub fn is_looping(self) -> bool {
        matches!(self, Cue::Beacon)
    }
}

/// Sink of spatial-audio parameter updates and cue triggers.
///
/// All operations are fire-and-forget: the core never queries device state,
/// so a device that drops a command degrades to a missing cue, never to a
/// stalled tick.
pub trait AudioBackend {
    /// Push the listener pose and velocity for this tick.
    fn set_listener(&mut self, position: Vec2, forward: Vec2, velocity: Vec2);

    /// Push a cue's emitter position and velocity.
    fn set_source(&mut self, cue: Cue, position: Vec2, velocity: Vec2);

    /// Set a cue's playback pitch (1.0 = natural).
    fn set_pitch(&mut self, cue: Cue, pitch: f32);

    /// Set a cue's gain (linear, 0.0–1.0).
    fn set_gain(&mut self, cue: Cue, gain: f32);

    /// Restart a one-shot cue from its beginning.
    fn play_oneshot(&mut self, cue: Cue);

    /// Idempotently require a looping cue to be playing (`true`) or stopped
    /// (`false`). Safe to call every tick.
    fn set_loop_active(&mut self, cue: Cue, active: bool);
}

/// One queued backend operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    Listener {
        position: Vec2,
        forward: Vec2,
        velocity: Vec2,
    },
    Source {
        cue: Cue,
        position: Vec2,
        velocity: Vec2,
    },
    Pitch {
        cue: Cue,
        value: f32,
    },
    Gain {
        cue: Cue,
        value: f32,
    },
    PlayOneShot {
        cue: Cue,
    },
    LoopActive {
        cue: Cue,
        active: bool,
    },
}

/// Production [`AudioBackend`]: a per-tick command queue drained by the
/// device layer.
///
/// Queuing decouples the synchronous guidance tick from bevy_audio's
/// asynchronous sink creation: commands that arrive before a sink exists
/// fold into persistent desired-state and are never lost.
#[derive(Resource, Debug, Default)]
pub struct AudioCommands {
    queue: Vec<AudioCommand>,
}

impl AudioCommands {
    /// Drain every queued command in push order.
    pub fn drain(&mut self) -> impl Iterator<Item = AudioCommand> + '_ {
        self.queue.drain(..)
    }

    /// Read-only view of the queue (used by tests).
    pub fn queued(&self) -> &[AudioCommand] {
        &self.queue
    }
}

impl AudioBackend for AudioCommands {
    fn set_listener(&mut self, position: Vec2, forward: Vec2, velocity: Vec2) {
        self.queue.push(AudioCommand::Listener {
            position,
            forward,
            velocity,
        });
    }

    fn set_source(&mut self, cue: Cue, position: Vec2, velocity: Vec2) {
        self.queue.push(AudioCommand::Source {
            cue,
            position,
            velocity,
        });
    }

    fn set_pitch(&mut self, cue: Cue, pitch: f32) {
        self.queue.push(AudioCommand::Pitch { cue, value: pitch });
    }

    fn set_gain(&mut self, cue: Cue, gain: f32) {
        self.queue.push(AudioCommand::Gain { cue, value: gain });
    }

    fn play_oneshot(&mut self, cue: Cue) {
        self.queue.push(AudioCommand::PlayOneShot { cue });
    }

    fn set_loop_active(&mut self, cue: Cue, active: bool) {
        self.queue.push(AudioCommand::LoopActive { cue, active });
    }
}
