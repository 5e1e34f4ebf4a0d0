//! Flyer - the player-controlled body
//!
//! Owns the flap velocity policy and the cosmetic tilt. Integration under
//! gravity happens in `physics`.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::config::WorldConfig;
use crate::core::fixed::{Fixed, from_int, to_int};
use crate::core::vec2::FixedVec2;
use crate::game::collision::Aabb;

/// Flyer tuning. Velocities are in units per second, negative is up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerConfig {
    /// Fixed horizontal position of the flyer's centre
    pub x: i32,
    /// Side length of the flyer's square body
    pub size: i32,
    /// Velocity set by a cold flap
    pub flap_velocity: i32,
    /// Decrement applied twice by a buffered flap
    pub flap_acceleration: i32,
    /// Fastest upward velocity a buffered flap may reach
    pub max_upward_velocity: i32,
    /// Flaps closer together than this are buffered
    pub flap_buffer_ms: u64,
    /// Tilt magnitude in degrees
    pub tilt_degrees: i32,
}

impl Default for FlyerConfig {
    fn default() -> Self {
        Self {
            x: 75,
            size: 30,
            flap_velocity: -225,
            flap_acceleration: 50,
            max_upward_velocity: -500,
            flap_buffer_ms: 300,
            tilt_degrees: 30,
        }
    }
}

/// Result of a single flap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlapOutcome {
    /// Vertical velocity after the flap
    pub velocity: Fixed,
    /// Whether the flap landed inside the buffering window
    pub buffered: bool,
}

/// Flap velocity policy.
///
/// `since_last_ms` is `None` when the flyer has never flapped.
/// A flap inside the buffering window subtracts the acceleration twice from
/// the current velocity and clamps at the maximum upward velocity; any
/// other flap resets the velocity to the default flap velocity.
pub fn flap_velocity(current: Fixed, since_last_ms: Option<u64>, config: &FlyerConfig) -> FlapOutcome {
    match since_last_ms {
        Some(gap) if gap < config.flap_buffer_ms => {
            let step = from_int(config.flap_acceleration);
            let velocity = current
                .saturating_sub(step)
                .saturating_sub(step)
                .max(from_int(config.max_upward_velocity));
            FlapOutcome { velocity, buffered: true }
        }
        _ => FlapOutcome {
            velocity: from_int(config.flap_velocity),
            buffered: false,
        },
    }
}

/// Tilt for a vertical velocity: nose up while rising, down while falling.
#[inline]
pub fn tilt_for_velocity(velocity: Fixed, tilt_degrees: i32) -> i32 {
    match velocity.signum() {
        -1 => -tilt_degrees,
        1 => tilt_degrees,
        _ => 0,
    }
}

/// State of the flyer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flyer {
    /// Centre of the body (y-down world space)
    pub position: FixedVec2,

    /// Body size
    pub size: FixedVec2,

    /// Vertical velocity (negative is up)
    pub velocity_y: Fixed,

    /// Whether gravity applies this frame
    pub gravity_enabled: bool,

    /// Simulation time of the previous flap
    pub last_flap_ms: Option<u64>,

    /// Cosmetic tilt in degrees (positive is nose down)
    pub tilt_degrees: i32,
}

impl Flyer {
    /// Create the flyer at rest, vertically centred, gravity off.
    pub fn spawn(config: &FlyerConfig, world: &WorldConfig) -> Self {
        Self {
            position: FixedVec2::new(from_int(config.x), from_int(world.height) >> 1),
            size: FixedVec2::from_ints(config.size, config.size),
            velocity_y: 0,
            gravity_enabled: false,
            last_flap_ms: None,
            tilt_degrees: 0,
        }
    }

    /// Apply a flap at `now_ms` and record it as the last flap.
    pub fn flap(&mut self, now_ms: u64, config: &FlyerConfig) -> FlapOutcome {
        let since_last = self.last_flap_ms.map(|last| now_ms.saturating_sub(last));
        let outcome = flap_velocity(self.velocity_y, since_last, config);

        self.velocity_y = outcome.velocity;
        self.last_flap_ms = Some(now_ms);

        debug!(
            now_ms,
            since_last = ?since_last,
            buffered = outcome.buffered,
            velocity = to_int(self.velocity_y),
            "flap"
        );

        outcome
    }

    /// Refresh the tilt from the current velocity sign.
    pub fn update_tilt(&mut self, config: &FlyerConfig) {
        self.tilt_degrees = tilt_for_velocity(self.velocity_y, config.tilt_degrees);
    }

    /// Axis-aligned body rectangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }
}
