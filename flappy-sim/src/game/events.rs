//! Run Events
//!
//! Events generated during simulation, drained once per tick. The host
//! reacts to them (overlay, logging) and replays compare them.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, to_int};

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Flyer overlapped a member of the collision group
    Collision { obstacle_id: u32 },
    /// Flyer crossed the top or bottom world boundary
    OutOfBounds,
}

impl fmt::Display for EndCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndCause::Collision { obstacle_id } => write!(f, "hit obstacle #{}", obstacle_id),
            EndCause::OutOfBounds => write!(f, "left the world"),
        }
    }
}

/// Run event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEventData {
    /// First flap: NotStarted -> Playing
    RunStarted,

    /// Flyer flapped
    Flapped {
        velocity: Fixed,
        buffered: bool,
    },

    /// A new obstacle pair entered the collision group
    ObstaclesSpawned {
        upper_id: u32,
        lower_id: u32,
        gap_start: i32,
        x: Fixed,
    },

    /// Obstacles left the world and were destroyed
    ObstaclesCulled {
        count: u32,
    },

    /// Playing -> GameOver
    RunEnded {
        cause: EndCause,
        score: u32,
    },

    /// GameOver -> NotStarted via confirm
    RunReset,
}

/// A run event stamped with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: RunEventData,
}

impl RunEvent {
    /// Create a new event.
    pub fn new(tick: u32, data: RunEventData) -> Self {
        Self { tick, data }
    }

    /// Create run started event.
    pub fn run_started(tick: u32) -> Self {
        Self::new(tick, RunEventData::RunStarted)
    }

    /// Create flapped event.
    pub fn flapped(tick: u32, velocity: Fixed, buffered: bool) -> Self {
        Self::new(tick, RunEventData::Flapped { velocity, buffered })
    }

    /// Create obstacles spawned event.
    pub fn obstacles_spawned(tick: u32, upper_id: u32, lower_id: u32, gap_start: i32, x: Fixed) -> Self {
        Self::new(
            tick,
            RunEventData::ObstaclesSpawned {
                upper_id,
                lower_id,
                gap_start,
                x,
            },
        )
    }

    /// Create obstacles culled event.
    pub fn obstacles_culled(tick: u32, count: u32) -> Self {
        Self::new(tick, RunEventData::ObstaclesCulled { count })
    }

    /// Create run ended event.
    pub fn run_ended(tick: u32, cause: EndCause, score: u32) -> Self {
        Self::new(tick, RunEventData::RunEnded { cause, score })
    }

    /// Create run reset event.
    pub fn run_reset(tick: u32) -> Self {
        Self::new(tick, RunEventData::RunReset)
    }

    /// Does this event end the run?
    pub fn is_run_end(&self) -> bool {
        matches!(self.data, RunEventData::RunEnded { .. })
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] ", self.tick)?;
        match &self.data {
            RunEventData::RunStarted => write!(f, "run started"),
            RunEventData::Flapped { velocity, buffered } => {
                let kind = if *buffered { "buffered" } else { "cold" };
                write!(f, "{} flap, vy = {}", kind, to_int(*velocity))
            }
            RunEventData::ObstaclesSpawned { gap_start, x, .. } => {
                write!(f, "obstacles spawned at x = {}, gap at {}", to_int(*x), gap_start)
            }
            RunEventData::ObstaclesCulled { count } => write!(f, "{} obstacles culled", count),
            RunEventData::RunEnded { cause, score } => {
                write!(f, "run ended ({}), score {}", cause, score)
            }
            RunEventData::RunReset => write!(f, "run reset"),
        }
    }
}
