//! Game module - drives the deterministic run simulation
//!
//! Rules:
//! - Space flaps, Enter restarts after a crash
//! - One simulation tick per fixed step (60 Hz)
//! - The run phase in the simulation is the source of truth for AppState

use std::env;

use bevy::input::InputSystem;
use bevy::prelude::*;
use flappy::{InputFrame, RunConfig, RunEvent, RunPhase, RunState};

use crate::AppState;

pub mod components;
pub mod visuals;

pub use components::*;
pub use visuals::*;

// ============================================================================
// GAME PLUGIN
// ============================================================================

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<RunSettings>() {
            app.insert_resource(RunSettings::from_env());
        }

        app
            // Resources
            .init_resource::<ActiveRun>()
            .init_resource::<KeyTaps>()
            .insert_resource(Time::<Fixed>::from_hz(flappy::TICK_RATE as f64))

            // Events
            .add_event::<RunEventMessage>()

            // Scene setup
            .add_systems(Startup, (fit_window, spawn_flyer))

            // Catch taps that start and end between two fixed steps
            .add_systems(PreUpdate, latch_key_taps.after(InputSystem))

            // Simulation (fixed timestep, same rate as the core)
            .add_systems(FixedUpdate, step_simulation)

            // Visual updates (variable timestep)
            .add_systems(Update, (
                sync_flyer_sprite,
                sync_obstacle_sprites,
                log_run_events,
            ));
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Seed and config for the session
#[derive(Resource, Clone, Debug)]
pub struct RunSettings {
    pub seed: u64,
    pub config: RunConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            config: RunConfig::default(),
        }
    }
}

impl RunSettings {
    /// Read `FLAPPY_CONFIG` and `FLAPPY_SEED`, falling back to defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(path) = env::var("FLAPPY_CONFIG") {
            match RunConfig::load(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path);
                    settings.config = config;
                }
                Err(e) => warn!("Ignoring config {}: {}", path, e),
            }
        }

        if let Ok(raw) = env::var("FLAPPY_SEED") {
            match raw.parse() {
                Ok(seed) => settings.seed = seed,
                Err(e) => warn!("Ignoring FLAPPY_SEED {:?}: {}", raw, e),
            }
        }

        settings
    }
}

/// The one live run
#[derive(Resource)]
pub struct ActiveRun {
    pub state: RunState,
    pub config: RunConfig,
}

impl FromWorld for ActiveRun {
    fn from_world(world: &mut World) -> Self {
        let settings = world.get_resource_or_insert_with(RunSettings::default).clone();
        info!("New session, seed {}", settings.seed);

        Self {
            state: RunState::new(settings.seed, &settings.config),
            config: settings.config,
        }
    }
}

/// Presses seen since the last simulation tick
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTaps {
    pub flap: bool,
    pub confirm: bool,
}

// ============================================================================
// EVENTS
// ============================================================================

/// A simulation event, forwarded to Bevy systems
#[derive(Event, Clone, Debug)]
pub struct RunEventMessage(pub RunEvent);

// ============================================================================
// SIMULATION
// ============================================================================

/// Scene state for a run phase
pub fn app_state_for(phase: RunPhase) -> AppState {
    match phase {
        RunPhase::NotStarted => AppState::NotStarted,
        RunPhase::Playing => AppState::Playing,
        RunPhase::GameOver => AppState::GameOver,
    }
}

/// Remember presses until a fixed step consumes them
pub fn latch_key_taps(keyboard: Res<ButtonInput<KeyCode>>, mut taps: ResMut<KeyTaps>) {
    taps.flap |= keyboard.just_pressed(KeyCode::Space);
    taps.confirm |= keyboard.just_pressed(KeyCode::Enter);
}

/// Feed key state into one simulation tick
///
/// A latched tap counts as down for one tick even if the key is already up.
pub fn step_simulation(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut taps: ResMut<KeyTaps>,
    mut run: ResMut<ActiveRun>,
    state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut events: EventWriter<RunEventMessage>,
) {
    let input = InputFrame::from_keys(
        keyboard.pressed(KeyCode::Space) || taps.flap,
        keyboard.pressed(KeyCode::Enter) || taps.confirm,
    );
    *taps = KeyTaps::default();

    let ActiveRun { state: run_state, config } = &mut *run;
    let result = flappy::tick(run_state, input, config);

    for event in result.events {
        events.send(RunEventMessage(event));
    }

    let wanted = app_state_for(run_state.phase);
    if *state.get() != wanted {
        next_state.set(wanted);
    }
}

/// Log what the simulation reports
fn log_run_events(mut events: EventReader<RunEventMessage>, run: Res<ActiveRun>) {
    for RunEventMessage(event) in events.read() {
        if event.is_run_end() {
            info!("{}", event);
            info!("State hash: {}", hex::encode(run.state.compute_hash()));
        } else {
            debug!("{}", event);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
