//! Authoritative Simulation Tick
//!
//! The per-frame scene update. Must be 100% deterministic: the same seed,
//! config and input frames always produce the same state hash.

use crate::config::RunConfig;
use crate::game::collision::detect_termination;
use crate::game::events::RunEvent;
use crate::game::input::InputFrame;
use crate::game::obstacle::spawn_pair;
use crate::game::physics::step_physics;
use crate::game::state::{RunPhase, RunState};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<RunEvent>,
    /// Whether the run ended this tick
    pub run_ended: bool,
    /// Whether the scene was reset this tick
    pub reset: bool,
}

/// Run one simulation tick.
///
/// # Arguments
///
/// * `state` - The run state (will be mutated)
/// * `input` - Raw key-down state for this frame
/// * `config` - Run configuration
///
/// # Order
///
/// 1. Advance the clock
/// 2. While playing: integrate, cull, then check termination
/// 3. Fire the spawn timer
/// 4. Scene update: phase transitions, flaps, tilt and score
///
/// # Determinism
///
/// Fixed-point math only, obstacles in a BTreeMap, randomness from
/// `state.rng`. No system calls, no floating point.
pub fn tick(state: &mut RunState, input: InputFrame, config: &RunConfig) -> TickResult {
    let mut result = TickResult::default();

    // 1. Advance tick counter
    state.tick += 1;

    // 2. Physics and termination (frozen outside of Playing)
    if state.phase == RunPhase::Playing {
        step_physics(state, config);

        if let Some(cause) = detect_termination(state, config.world.height) {
            state.end_run(cause);
            result.run_ended = true;
        }
    }

    // 3. Spawn timer (cancelled by end_run, so no final fire)
    let fires = state.spawn_timer.poll(state.now_ms());
    for _ in 0..fires {
        spawn_pair(state, config);
    }

    // 4. Scene update
    let flap_edge = state.flap_key.rising_edge(input.flap_down());
    let confirm_edge = state.confirm_key.rising_edge(input.confirm_down());

    match state.phase {
        RunPhase::NotStarted => {
            state.flyer.gravity_enabled = false;

            if flap_edge {
                state.begin_run();
                apply_flap(state, config);
            }
        }
        RunPhase::Playing => {
            if flap_edge {
                apply_flap(state, config);
            }
            state.flyer.update_tilt(&config.flyer);
            state.score = state.score.saturating_add(1);
        }
        RunPhase::GameOver => {
            if confirm_edge && !result.run_ended {
                state.reset(config);
                result.reset = true;
            }
        }
    }

    // Collect events
    result.events = state.take_events();

    result
}

/// Flap at the current simulation time and record the event.
fn apply_flap(state: &mut RunState, config: &RunConfig) {
    let outcome = state.flyer.flap(state.now_ms(), &config.flyer);
    let event = RunEvent::flapped(state.tick, outcome.velocity, outcome.buffered);
    state.push_event(event);
}

/// Replay a run from recorded input frames.
///
/// Every frame is simulated, including any resets the frames trigger.
/// Returns the final state and all events in order.
pub fn replay_run(
    initial_state: RunState,
    frames: &[InputFrame],
    config: &RunConfig,
) -> (RunState, Vec<RunEvent>) {
    let mut state = initial_state;
    let mut all_events = state.take_events();

    for frame in frames {
        let result = tick(&mut state, *frame, config);
        all_events.extend(result.events);
    }

    (state, all_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{fixed_mul, from_int, TICK_DURATION};
    use crate::game::events::{EndCause, RunEventData};

    fn config() -> RunConfig {
        RunConfig::default()
    }

    /// Press on even frames, release on odd ones.
    fn tap(frame: u32) -> InputFrame {
        InputFrame::from_keys(frame % 2 == 0, false)
    }

    #[test]
    fn test_nothing_happens_before_first_flap() {
        let config = config();
        let mut state = RunState::new(5, &config);
        let start = state.flyer.clone();
        let preview: Vec<_> = state.obstacles.values().cloned().collect();

        for _ in 0..600 {
            let result = tick(&mut state, InputFrame::confirm(), &config);
            assert!(!result.run_ended);
            assert!(!result.reset);
        }

        assert_eq!(state.phase, RunPhase::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.flyer, start);
        assert_eq!(state.obstacles.values().cloned().collect::<Vec<_>>(), preview);
    }

    #[test]
    fn test_first_flap_starts_run() {
        let config = config();
        let mut state = RunState::new(5, &config);
        state.take_events();

        let result = tick(&mut state, InputFrame::flap(), &config);
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(state.flyer.gravity_enabled);
        assert!(state.spawn_timer.is_active());
        assert_eq!(state.flyer.velocity_y, from_int(-225));
        assert_eq!(state.score, 0);

        let kinds: Vec<_> = result.events.iter().map(|e| e.data.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                RunEventData::RunStarted,
                RunEventData::Flapped { velocity: from_int(-225), buffered: false },
            ]
        );
    }

    #[test]
    fn test_unbounded_spawn_interval_never_fires() {
        // Built in code, so validation never sees it
        let mut config = config();
        config.obstacles.spawn_interval_ms = u64::MAX;
        config.obstacles.preview = false;
        let mut state = RunState::new(5, &config);

        tick(&mut state, InputFrame::flap(), &config);
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.spawn_timer.next_fire_ms, Some(u64::MAX));

        for _ in 0..100 {
            tick(&mut state, InputFrame::new(), &config);
        }
        assert!(state.obstacles.is_empty());
        assert!(state.is_playing());
    }

    #[test]
    fn test_held_key_flaps_once() {
        let config = config();
        let mut state = RunState::new(5, &config);

        tick(&mut state, InputFrame::flap(), &config);
        let mut flaps = 0;
        for _ in 0..20 {
            let result = tick(&mut state, InputFrame::flap(), &config);
            flaps += result
                .events
                .iter()
                .filter(|e| matches!(e.data, RunEventData::Flapped { .. }))
                .count();
        }
        assert_eq!(flaps, 0);
        assert!(state.flap_key.is_held());
    }

    #[test]
    fn test_buffered_flaps_through_tick() {
        let config = config();
        let mut state = RunState::new(5, &config);

        // Start at tick 1, release, press again at tick 3 (~33 ms later)
        tick(&mut state, InputFrame::flap(), &config);
        tick(&mut state, InputFrame::new(), &config);
        let before = state.flyer.velocity_y;
        let result = tick(&mut state, InputFrame::flap(), &config);

        // Gravity is applied before the flap
        let fall = fixed_mul(from_int(config.world.gravity), TICK_DURATION);
        assert_eq!(state.flyer.velocity_y, before + fall - from_int(100));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e.data, RunEventData::Flapped { buffered: true, .. })));
    }

    #[test]
    fn test_score_counts_playing_frames() {
        let config = config();
        let mut state = RunState::new(5, &config);

        tick(&mut state, InputFrame::flap(), &config);
        for n in 1..=30 {
            tick(&mut state, InputFrame::new(), &config);
            assert_eq!(state.score, n);
        }
    }

    #[test]
    fn test_fall_to_bottom_ends_run() {
        let mut config = config();
        config.obstacles.preview = false;
        let mut state = RunState::new(5, &config);

        tick(&mut state, InputFrame::flap(), &config);
        let mut ended = None;
        for _ in 0..600 {
            let result = tick(&mut state, InputFrame::new(), &config);
            if result.run_ended {
                ended = Some(result);
                break;
            }
        }

        let result = ended.expect("flyer should hit the floor");
        assert_eq!(state.phase, RunPhase::GameOver);
        assert!(!state.spawn_timer.is_active());
        assert!(state.obstacles.is_empty());

        let end = result.events.iter().find(|e| e.is_run_end()).unwrap();
        match end.data {
            RunEventData::RunEnded { cause, score } => {
                assert_eq!(cause, EndCause::OutOfBounds);
                assert_eq!(score, state.score);
            }
            _ => unreachable!(),
        }

        // Physics is frozen and score no longer changes
        let frozen = state.flyer.clone();
        let score = state.score;
        for f in 0..120 {
            tick(&mut state, tap(f), &config);
        }
        assert_eq!(state.flyer, frozen);
        assert_eq!(state.score, score);
        assert_eq!(state.phase, RunPhase::GameOver);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_obstacles_spawn_on_interval() {
        let mut config = config();
        config.obstacles.preview = false;
        let mut state = RunState::new(5, &config);

        // Start the run at tick 1 (16 ms); first fire due at 1816 ms (tick 109)
        tick(&mut state, InputFrame::flap(), &config);
        let mut spawned_at = Vec::new();
        for f in 0..400 {
            // Keep the flyer aloft by hand
            state.flyer.position.y = from_int(400);
            let result = tick(&mut state, tap(f + 1), &config);
            for event in &result.events {
                if matches!(event.data, RunEventData::ObstaclesSpawned { .. }) {
                    spawned_at.push(event.tick);
                }
            }
            if result.run_ended {
                break;
            }
        }

        assert!(spawned_at.len() >= 2, "spawned at {:?}", spawned_at);
        assert_eq!(spawned_at[0], 109);
        assert_eq!(spawned_at[1], 217);
    }

    #[test]
    fn test_confirm_resets_after_game_over() {
        let config = config();
        let mut state = RunState::new(5, &config);

        tick(&mut state, InputFrame::flap(), &config);
        state.flyer.position.y = from_int(900);
        let result = tick(&mut state, InputFrame::new(), &config);
        assert!(result.run_ended);

        // Flap does nothing in GameOver
        tick(&mut state, InputFrame::flap(), &config);
        tick(&mut state, InputFrame::new(), &config);
        assert_eq!(state.phase, RunPhase::GameOver);

        let result = tick(&mut state, InputFrame::confirm(), &config);
        assert!(result.reset);
        assert_eq!(state.phase, RunPhase::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.obstacles.len(), 2);
        assert!(result.events.iter().any(|e| e.data == RunEventData::RunReset));

        // A new run can begin
        tick(&mut state, InputFrame::flap(), &config);
        assert_eq!(state.phase, RunPhase::Playing);
    }

    #[test]
    fn test_tick_determinism() {
        let config = config();
        let mut state1 = RunState::new(12345, &config);
        let mut state2 = RunState::new(12345, &config);

        for f in 0..900 {
            let input = InputFrame::from_keys(f % 23 < 2, f % 97 == 0);
            tick(&mut state1, input, &config);
            tick(&mut state2, input, &config);
        }

        assert_eq!(state1.tick, state2.tick);
        assert_eq!(state1.compute_hash(), state2.compute_hash());
    }

    #[test]
    fn test_replay_determinism() {
        let config = config();
        let frames: Vec<InputFrame> = (0..1200)
            .map(|t| InputFrame::from_keys(t % 19 == 0, t % 301 == 0))
            .collect();

        let (final1, events1) = replay_run(RunState::new(99999, &config), &frames, &config);
        let (final2, events2) = replay_run(RunState::new(99999, &config), &frames, &config);

        assert_eq!(final1.tick, 1200);
        assert_eq!(final1.compute_hash(), final2.compute_hash());
        assert_eq!(events1, events2);

        let (other, _) = replay_run(RunState::new(1, &config), &frames, &config);
        assert_ne!(final1.compute_hash(), other.compute_hash());
    }
}
