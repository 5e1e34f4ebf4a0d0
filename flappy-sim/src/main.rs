//! Flappy Headless Runner
//!
//! Plays a session with the autopilot, logs run events and verifies
//! determinism by replaying the recorded inputs.
//!
//! Usage: `flappy-sim [seed] [ticks]`
//!
//! - `FLAPPY_CONFIG=<path>` loads a JSON run config
//! - `FLAPPY_RECORD=<path>` writes the session recording as JSON
//! - `RUST_LOG` filters log output (default `info`)

use std::env;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flappy::{
    TICK_RATE, VERSION,
    Autopilot, RunConfig, RunRecording, RunState, RunEventData, tick,
};

/// Default session length: two minutes of play.
const DEFAULT_TICKS: u32 = 120 * TICK_RATE;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Flappy Sim v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("invalid seed {:?}", arg))?,
        None => 12345,
    };
    let ticks = match args.next() {
        Some(arg) => arg.parse::<u32>().with_context(|| format!("invalid tick count {:?}", arg))?,
        None => DEFAULT_TICKS,
    };

    let config = load_config();
    let recording = demo_session(seed, ticks, &config);
    verify_session(&recording)?;

    if let Ok(path) = env::var("FLAPPY_RECORD") {
        recording
            .save(&path)
            .with_context(|| format!("failed to write recording to {}", path))?;
        info!("Recording written to {}", path);
    }

    Ok(())
}

/// Config from `FLAPPY_CONFIG`, or the defaults.
fn load_config() -> RunConfig {
    let Ok(path) = env::var("FLAPPY_CONFIG") else {
        return RunConfig::default();
    };

    match RunConfig::load(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            warn!("Ignoring config {}: {}", path, e);
            RunConfig::default()
        }
    }
}

/// Play a session with the autopilot and record it.
fn demo_session(seed: u64, ticks: u32, config: &RunConfig) -> RunRecording {
    info!("=== Starting Demo Session ===");
    info!("RNG Seed: {}", seed);

    let pilot = Autopilot::default();
    let mut state = RunState::new(seed, config);
    let mut recording = RunRecording::new(seed, config.clone());

    info!("Running {} ticks...", ticks);

    let mut runs = 0u32;
    let mut best = 0u32;
    let mut total_events = 0usize;

    for _ in 0..ticks {
        let input = pilot.next_input(&state, config);
        recording.record(input);

        let result = tick(&mut state, input, config);
        total_events += result.events.len();

        // Log important events
        for event in &result.events {
            match &event.data {
                RunEventData::RunStarted => {
                    runs += 1;
                    info!("{} (run #{})", event, runs);
                }
                RunEventData::RunEnded { score, .. } => {
                    best = best.max(*score);
                    info!("{}", event);
                }
                RunEventData::RunReset => info!("{}", event),
                _ => {}
            }
        }

        // Report every 10 seconds
        if state.tick % (10 * TICK_RATE) == 0 {
            info!(
                "Tick {}: {:?}, score {}, {} obstacles, {} events so far",
                state.tick,
                state.phase,
                state.score,
                state.obstacles.len(),
                total_events
            );
        }
    }

    // Print final results
    info!("=== Session Results ===");
    if state.is_playing() {
        best = best.max(state.score);
    }
    info!("Runs started: {}", runs);
    info!("Best score: {}", best);
    info!("Total events: {}", total_events);

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Input Digest: {}", hex::encode(recording.input_digest()));
    recording.seal(&hash);

    recording
}

/// Replay the recording and compare hashes.
fn verify_session(recording: &RunRecording) -> Result<()> {
    info!("=== Verifying Determinism ===");

    let (replayed, _) = recording.replay();
    let replay_hash = hex::encode(replayed.compute_hash());
    info!("Replay State Hash: {}", replay_hash);

    match recording.final_hash.as_deref() {
        Some(expected) if expected == replay_hash => {
            info!("DETERMINISM VERIFIED: Hashes match!");
            Ok(())
        }
        expected => anyhow::bail!(
            "DETERMINISM FAILURE: expected {:?}, replay produced {}",
            expected,
            replay_hash
        ),
    }
}
