//! # Flappy Simulation Core
//!
//! Deterministic run simulation for the Flappy side-scroller. A host (the
//! Bevy client, the headless demo, a test) feeds one raw input frame per
//! fixed tick and renders whatever the state says.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FLAPPY SIMULATION                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Run logic (deterministic)                 │
//! │  ├── input.rs    - Key frames and edge detection             │
//! │  ├── state.rs    - Run state and scene phase                 │
//! │  ├── tick.rs     - Authoritative per-frame update            │
//! │  ├── flyer.rs    - Flap policy and tilt                      │
//! │  ├── obstacle.rs - Obstacle pairs and spawn timer            │
//! │  ├── physics.rs  - Integration and culling                   │
//! │  ├── collision.rs- Overlap and boundary tests                │
//! │  └── autopilot.rs- Scripted input for headless runs          │
//! │                                                              │
//! │  config.rs       - JSON run configuration                    │
//! │  replay.rs       - Session recording and verification        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No wall-clock time; simulation time derives from the tick counter
//! - All randomness from seeded Xorshift128+
//!
//! Given identical inputs, config and seed, a session produces the same
//! state hash on any platform.
//!
//! ```
//! use flappy::{RunConfig, RunState, InputFrame, tick};
//!
//! let config = RunConfig::default();
//! let mut state = RunState::new(42, &config);
//!
//! let result = tick(&mut state, InputFrame::flap(), &config);
//! assert!(state.is_playing());
//! assert!(!result.run_ended);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;
pub mod replay;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rng::DeterministicRng;
pub use core::hash::StateHash;
pub use config::{ConfigError, RunConfig, WorldConfig};
pub use game::input::InputFrame;
pub use game::state::{RunPhase, RunState};
pub use game::tick::{tick, replay_run, TickResult};
pub use game::autopilot::Autopilot;
pub use game::events::{EndCause, RunEvent, RunEventData};
pub use replay::{ReplayError, RunRecording};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
