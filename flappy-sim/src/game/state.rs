//! Run State Definitions
//!
//! The complete state of one run: scene phase, flyer, collision group,
//! spawn timer and score. Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::info;

use crate::config::RunConfig;
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::events::{EndCause, RunEvent};
use crate::game::flyer::Flyer;
use crate::game::input::KeyLatch;
use crate::game::obstacle::{Obstacle, SpawnTimer, spawn_pair};
use crate::TICK_RATE;

// =============================================================================
// RUN PHASE
// =============================================================================

/// Scene phase of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RunPhase {
    /// Flyer hovers, waiting for the first flap
    #[default]
    NotStarted = 0,
    /// Gravity on, obstacles spawning, score counting
    Playing = 1,
    /// Run is over, waiting for confirm
    GameOver = 2,
}

// =============================================================================
// RUN STATE
// =============================================================================

/// Complete state of a run.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunState {
    /// Ticks simulated since creation (never reset)
    pub tick: u32,

    /// Current scene phase
    pub phase: RunPhase,

    /// RNG seed (for verification)
    pub rng_seed: u64,

    /// Deterministic RNG state
    pub rng: DeterministicRng,

    /// Frames survived in the current run
    pub score: u32,

    /// The player-controlled body
    pub flyer: Flyer,

    /// Live obstacles, keyed by id
    pub obstacles: BTreeMap<u32, Obstacle>,

    /// Monotonic obstacle id counter
    pub obstacle_counter: u32,

    /// Obstacle spawn timer
    pub spawn_timer: SpawnTimer,

    /// Edge detector for the flap key
    pub flap_key: KeyLatch,

    /// Edge detector for the confirm key
    pub confirm_key: KeyLatch,

    /// Events generated this tick (cleared each tick)
    #[serde(skip)]
    pub pending_events: Vec<RunEvent>,
}

impl RunState {
    /// Create a run waiting for its first flap.
    pub fn new(rng_seed: u64, config: &RunConfig) -> Self {
        let mut state = Self {
            tick: 0,
            phase: RunPhase::NotStarted,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            score: 0,
            flyer: Flyer::spawn(&config.flyer, &config.world),
            obstacles: BTreeMap::new(),
            obstacle_counter: 0,
            spawn_timer: SpawnTimer::new(config.obstacles.spawn_interval_ms),
            flap_key: KeyLatch::default(),
            confirm_key: KeyLatch::default(),
            pending_events: Vec::new(),
        };

        if config.obstacles.preview {
            spawn_pair(&mut state, config);
        }

        state
    }

    /// Simulation time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.tick as u64 * 1000 / TICK_RATE as u64
    }

    /// Allocate the next obstacle id.
    pub fn next_obstacle_id(&mut self) -> u32 {
        let id = self.obstacle_counter;
        self.obstacle_counter += 1;
        id
    }

    /// Is a run in progress?
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == RunPhase::Playing
    }

    /// NotStarted -> Playing.
    ///
    /// Enables gravity and starts the spawn timer. The flap that triggered
    /// the transition is applied by the caller.
    pub fn begin_run(&mut self) {
        if self.phase != RunPhase::NotStarted {
            return;
        }

        self.phase = RunPhase::Playing;
        self.flyer.gravity_enabled = true;
        self.spawn_timer.start(self.now_ms());
        self.push_event(RunEvent::run_started(self.tick));

        info!(tick = self.tick, "run started");
    }

    /// Playing -> GameOver.
    ///
    /// Stops spawning and destroys every obstacle. The flyer stays where
    /// it died; the final score is frozen.
    pub fn end_run(&mut self, cause: EndCause) {
        if self.phase != RunPhase::Playing {
            return;
        }

        self.phase = RunPhase::GameOver;
        self.spawn_timer.cancel();
        self.obstacles.clear();
        self.flyer.gravity_enabled = false;
        self.flyer.velocity_y = 0;
        self.push_event(RunEvent::run_ended(self.tick, cause, self.score));

        info!(tick = self.tick, score = self.score, %cause, "run ended");
    }

    /// GameOver -> NotStarted, in place.
    ///
    /// Restores the initial scene while keeping the tick counter, the RNG
    /// stream and the obstacle id counter running.
    pub fn reset(&mut self, config: &RunConfig) {
        self.phase = RunPhase::NotStarted;
        self.score = 0;
        self.flyer = Flyer::spawn(&config.flyer, &config.world);
        self.obstacles.clear();
        self.spawn_timer = SpawnTimer::new(config.obstacles.spawn_interval_ms);
        self.push_event(RunEvent::run_reset(self.tick));

        if config.obstacles.preview {
            spawn_pair(self, config);
        }

        info!(tick = self.tick, "run reset");
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            hasher.update_u32(self.score);

            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);

            let flyer = &self.flyer;
            hasher.update_vec2(flyer.position);
            hasher.update_fixed(flyer.velocity_y);
            hasher.update_bool(flyer.gravity_enabled);
            hasher.update_opt_u64(flyer.last_flap_ms);
            hasher.update_i32(flyer.tilt_degrees);

            // Sorted by id (BTreeMap guarantees this)
            hasher.update_u32(self.obstacles.len() as u32);
            for obstacle in self.obstacles.values() {
                hasher.update_u32(obstacle.id);
                hasher.update_u8(obstacle.kind as u8);
                hasher.update_vec2(obstacle.center);
                hasher.update_vec2(obstacle.size);
                hasher.update_fixed(obstacle.velocity_x);
            }
            hasher.update_u32(self.obstacle_counter);

            hasher.update_opt_u64(self.spawn_timer.next_fire_ms);
            hasher.update_bool(self.flap_key.is_held());
            hasher.update_bool(self.confirm_key.is_held());
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a run event.
    pub fn push_event(&mut self, event: RunEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
