//! Run Configuration
//!
//! All gameplay constants in one serde-friendly tree. Values are whole
//! world units (pixels) and milliseconds so a JSON file stays readable;
//! the simulation converts them to fixed-point on use.
//!
//! ```json
//! {
//!   "world": { "width": 480, "height": 800, "gravity": 400 },
//!   "obstacles": { "gap_height": 140 }
//! }
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::flyer::FlyerConfig;
use crate::game::obstacle::ObstacleConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for a `RunConfig`
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed, but the values cannot produce a playable world
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// World dimensions and gravity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width
    pub width: i32,
    /// World height
    pub height: i32,
    /// Downward acceleration on the flyer, units/s²
    pub gravity: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 800,
            gravity: 400,
        }
    }
}

/// Complete configuration for a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// World dimensions and gravity
    pub world: WorldConfig,
    /// Flyer tuning
    pub flyer: FlyerConfig,
    /// Obstacle tuning
    pub obstacles: ObstacleConfig,
}

/// Largest coordinate magnitude that stays well inside Q16.16.
const MAX_EXTENT: i32 = 16_384;

/// Largest speed or acceleration, in units per second. A fall across a
/// `MAX_EXTENT` world under this gravity stays below `i32::MAX` in Q16.16.
const MAX_SPEED: i32 = 4_096;

/// Longest spawn interval (one hour).
const MAX_SPAWN_INTERVAL_MS: u64 = 3_600_000;

impl RunConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that the values describe a playable world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        let flyer = &self.flyer;
        let obstacles = &self.obstacles;

        if world.width <= 0 || world.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "world must have a positive size, got {}x{}",
                world.width, world.height
            )));
        }
        if world.width > MAX_EXTENT || world.height > MAX_EXTENT {
            return Err(ConfigError::Invalid(format!(
                "world may not exceed {} units per side",
                MAX_EXTENT
            )));
        }
        if world.gravity < 0 {
            return Err(ConfigError::Invalid("gravity may not point up".into()));
        }
        let rates = [
            ("gravity", world.gravity),
            ("flap velocity", flyer.flap_velocity),
            ("flap acceleration", flyer.flap_acceleration),
            ("max upward velocity", flyer.max_upward_velocity),
            ("obstacle speed", obstacles.speed),
        ];
        for (name, value) in rates {
            if value.unsigned_abs() > MAX_SPEED as u32 {
                return Err(ConfigError::Invalid(format!(
                    "{} {} exceeds {} units per second",
                    name, value, MAX_SPEED
                )));
            }
        }
        if flyer.size <= 0 || flyer.size >= world.height {
            return Err(ConfigError::Invalid(format!(
                "flyer size {} must be positive and smaller than the world",
                flyer.size
            )));
        }
        if flyer.x < 0 || flyer.x > world.width {
            return Err(ConfigError::Invalid(format!("flyer x {} is outside the world", flyer.x)));
        }
        if flyer.flap_velocity >= 0 {
            return Err(ConfigError::Invalid("flap velocity must point up (negative)".into()));
        }
        if flyer.flap_acceleration < 0 {
            return Err(ConfigError::Invalid("flap acceleration may not be negative".into()));
        }
        if flyer.max_upward_velocity > flyer.flap_velocity {
            return Err(ConfigError::Invalid(format!(
                "max upward velocity {} is weaker than the flap velocity {}",
                flyer.max_upward_velocity, flyer.flap_velocity
            )));
        }
        if obstacles.width <= 0 {
            return Err(ConfigError::Invalid("obstacle width must be positive".into()));
        }
        if obstacles.gap_height <= 0 || obstacles.gap_height >= world.height {
            return Err(ConfigError::Invalid(format!(
                "gap height {} must be positive and smaller than the world height {}",
                obstacles.gap_height, world.height
            )));
        }
        if obstacles.speed <= 0 {
            return Err(ConfigError::Invalid("obstacles must scroll left (positive speed)".into()));
        }
        if obstacles.spawn_interval_ms == 0 || obstacles.spawn_interval_ms > MAX_SPAWN_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "spawn interval {} ms must be in 1..={}",
                obstacles.spawn_interval_ms, MAX_SPAWN_INTERVAL_MS
            )));
        }

        Ok(())
    }
}
