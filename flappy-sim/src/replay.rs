//! Session Recording
//!
//! Records everything needed to re-simulate a session bit for bit: the
//! seed, the config and one raw input frame per tick. Stored as JSON.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::core::hash::{StateHash, StateHasher};
use crate::game::events::RunEvent;
use crate::game::input::InputFrame;
use crate::game::state::RunState;
use crate::game::tick::replay_run;

/// Current recording format version.
pub const RECORDING_VERSION: u8 = 1;

/// Recording errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Could not read or write the file
    #[error("recording i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Not a valid recording document
    #[error("malformed recording: {0}")]
    Format(#[from] serde_json::Error),

    /// The embedded config does not validate
    #[error("recording carries a bad config: {0}")]
    Config(#[from] ConfigError),

    /// Written by an incompatible version
    #[error("unsupported recording version {0}")]
    Version(u8),
}

/// A recorded session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecording {
    /// Format version
    pub version: u8,

    /// Seed the session was created with
    pub seed: u64,

    /// Config the session ran under
    pub config: RunConfig,

    /// One input frame per tick, starting at tick 1
    pub frames: Vec<InputFrame>,

    /// Hex state hash after the last frame, if known
    pub final_hash: Option<String>,
}

impl RunRecording {
    /// Start an empty recording.
    pub fn new(seed: u64, config: RunConfig) -> Self {
        Self {
            version: RECORDING_VERSION,
            seed,
            config,
            frames: Vec::new(),
            final_hash: None,
        }
    }

    /// Append the input for the next tick.
    pub fn record(&mut self, frame: InputFrame) {
        self.frames.push(frame);
    }

    /// Stamp the final state hash.
    pub fn seal(&mut self, hash: &StateHash) {
        self.final_hash = Some(hex::encode(hash));
    }

    /// Re-simulate from a fresh state.
    pub fn replay(&self) -> (RunState, Vec<RunEvent>) {
        let initial = RunState::new(self.seed, &self.config);
        replay_run(initial, &self.frames, &self.config)
    }

    /// Replay and compare against the sealed hash.
    ///
    /// Returns `None` for unsealed recordings.
    pub fn verify(&self) -> Option<bool> {
        let expected = self.final_hash.as_ref()?;
        let (state, _) = self.replay();
        Some(hex::encode(state.compute_hash()) == *expected)
    }

    /// Digest of the input stream alone.
    pub fn input_digest(&self) -> StateHash {
        let mut hasher = StateHasher::for_input_frames();
        hasher.update_u64(self.seed);
        hasher.update_u32(self.frames.len() as u32);
        for frame in &self.frames {
            hasher.update_u8(frame.flags);
        }
        hasher.finalize()
    }

    /// Write as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read and validate a recording.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path)?;
        let recording: RunRecording = serde_json::from_str(&text)?;

        if recording.version != RECORDING_VERSION {
            return Err(ReplayError::Version(recording.version));
        }
        recording.config.validate()?;

        Ok(recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::autopilot::Autopilot;
    use crate::game::tick::tick;

    fn record_session(seed: u64, ticks: u32) -> (RunRecording, RunState) {
        let config = RunConfig::default();
        let pilot = Autopilot::default();
        let mut state = RunState::new(seed, &config);
        let mut recording = RunRecording::new(seed, config.clone());

        for _ in 0..ticks {
            let input = pilot.next_input(&state, &config);
            recording.record(input);
            tick(&mut state, input, &config);
        }
        recording.seal(&state.compute_hash());
        (recording, state)
    }

    #[test]
    fn test_replay_matches_live_session() {
        let (recording, live) = record_session(2024, 1500);
        let (replayed, _) = recording.replay();

        assert_eq!(replayed.tick, live.tick);
        assert_eq!(replayed.compute_hash(), live.compute_hash());
        assert_eq!(recording.verify(), Some(true));
    }

    #[test]
    fn test_tampered_recording_fails_verify() {
        let (mut recording, _) = record_session(2024, 600);
        recording.frames.pop();

        assert_eq!(recording.verify(), Some(false));
        assert_eq!(RunRecording::new(1, RunConfig::default()).verify(), None);
    }

    #[test]
    fn test_save_and_load() {
        let (recording, _) = record_session(77, 400);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        recording.save(&path).unwrap();
        let loaded = RunRecording::load(&path).unwrap();

        assert_eq!(loaded.input_digest(), recording.input_digest());
        assert_eq!(loaded.verify(), Some(true));
    }

    #[test]
    fn test_load_rejects_bad_config() {
        let mut recording = RunRecording::new(1, RunConfig::default());
        recording.config.obstacles.spawn_interval_ms = 0;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        recording.save(&path).unwrap();

        assert!(matches!(RunRecording::load(&path), Err(ReplayError::Config(_))));
    }

    #[test]
    fn test_load_rejects_future_version() {
        let mut recording = RunRecording::new(1, RunConfig::default());
        recording.version = 9;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        recording.save(&path).unwrap();

        assert!(matches!(RunRecording::load(&path), Err(ReplayError::Version(9))));
    }

    #[test]
    fn test_input_digest_depends_on_frames() {
        let mut a = RunRecording::new(1, RunConfig::default());
        let mut b = a.clone();
        a.record(InputFrame::flap());
        b.record(InputFrame::new());

        assert_ne!(a.input_digest(), b.input_digest());
    }
}
