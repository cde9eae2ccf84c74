//! Game-specific error types.
//!
//! The guidance loop itself never fails: division guards and clamps handle
//! the transient degenerate states (zero distance, zero Δt).  Errors exist at
//! the edges: audio resources that cannot be loaded are a fatal startup
//! condition (the game is unplayable without its cues), while runtime audio
//! anomalies degrade to silent no-ops in the device layer.

use std::fmt;

/// Top-level error enum for the earshot game.
#[derive(Debug)]
pub enum GameError {
    /// A cue's audio asset failed to load or decode at startup.
    /// Fatal: the game cannot be played without its audio cues.
    AudioAssetFailed {
        /// Asset path that failed, e.g. `audio/beacon.wav`.
        path: String,
        /// Loader error description.
        reason: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::AudioAssetFailed { path, reason } => {
                write!(f, "audio asset '{}' failed to load: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_asset_path() {
        let err = GameError::AudioAssetFailed {
            path: "audio/beacon.wav".into(),
            reason: "not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("audio/beacon.wav"));
        assert!(msg.contains("not found"));
    }
}
