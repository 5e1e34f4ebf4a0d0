//! Game Logic Module
//!
//! All run simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Raw key frames and edge detection
//! - `state`: Run state and scene phase
//! - `tick`: Authoritative per-frame update
//! - `flyer`: Flap policy and tilt
//! - `obstacle`: Obstacle pairs, gap layout, spawn timer
//! - `physics`: Integration and off-screen culling
//! - `collision`: Overlap and boundary tests
//! - `autopilot`: Deterministic input policy for headless runs
//! - `events`: Run events for hosts and replay

pub mod input;
pub mod state;
pub mod tick;
pub mod flyer;
pub mod obstacle;
pub mod physics;
pub mod collision;
pub mod autopilot;
pub mod events;

// Re-export key types
pub use input::{InputFrame, KeyLatch};
pub use state::{RunState, RunPhase};
pub use tick::{tick, replay_run, TickResult};
pub use flyer::{Flyer, FlyerConfig};
pub use obstacle::{Obstacle, ObstacleConfig, ObstacleKind};
pub use autopilot::Autopilot;
pub use events::{RunEvent, RunEventData, EndCause};
