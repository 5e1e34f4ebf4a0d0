//! Autopilot
//!
//! A deterministic input policy for headless sessions. It produces the
//! same raw key frames a player would, so everything it does goes through
//! the regular edge detection in `tick`.

use crate::config::RunConfig;
use crate::core::fixed::{Fixed, from_int};
use crate::game::input::InputFrame;
use crate::game::state::{RunPhase, RunState};

/// Flaps whenever the flyer sinks below the next gap's aim point.
#[derive(Clone, Debug)]
pub struct Autopilot {
    /// Aim this far below the gap centre, in units
    pub aim_offset: i32,
    /// Press confirm after a run ends
    pub restart: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            aim_offset: 30,
            restart: true,
        }
    }
}

impl Autopilot {
    /// Create an autopilot.
    pub fn new(aim_offset: i32, restart: bool) -> Self {
        Self { aim_offset, restart }
    }

    /// Vertical position the flyer should hold right now.
    ///
    /// Aims at the nearest pair whose right edge is still ahead of the
    /// flyer's left edge; with no pair in reach, the middle of the world.
    pub fn target_y(&self, state: &RunState, config: &RunConfig) -> Fixed {
        let flyer_left = state.flyer.bounds().min.x;

        let gap_bottom = state
            .obstacles
            .values()
            .filter(|o| o.bounds().right() >= flyer_left)
            .min_by_key(|o| (o.center.x, o.id))
            .map(|nearest| {
                // Both halves share x; take the lower one's top edge
                state
                    .obstacles
                    .values()
                    .filter(|o| o.center.x == nearest.center.x)
                    .map(|o| o.bounds().top())
                    .max()
                    .unwrap_or(from_int(config.world.height))
            });

        match gap_bottom {
            Some(bottom) => {
                let half_gap = from_int(config.obstacles.gap_height) >> 1;
                bottom - half_gap + from_int(self.aim_offset)
            }
            None => from_int(config.world.height) >> 1,
        }
    }

    /// Input frame for the next tick.
    pub fn next_input(&self, state: &RunState, config: &RunConfig) -> InputFrame {
        match state.phase {
            RunPhase::NotStarted => InputFrame::from_keys(!state.flap_key.is_held(), false),
            RunPhase::GameOver => {
                let press = self.restart && !state.confirm_key.is_held();
                InputFrame::from_keys(false, press)
            }
            RunPhase::Playing => {
                if state.flap_key.is_held() {
                    return InputFrame::new();
                }

                let flyer = &state.flyer;
                let target = self.target_y(state, config);
                let sinking = flyer.position.y > target && flyer.velocity_y >= 0;
                let far_below = flyer.position.y > target + from_int(config.flyer.size * 2);

                InputFrame::from_keys(sinking || far_below, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tick::tick;

    #[test]
    fn test_starts_the_run() {
        let config = RunConfig::default();
        let state = RunState::new(1, &config);
        let pilot = Autopilot::default();

        assert!(pilot.next_input(&state, &config).flap_down());
    }

    #[test]
    fn test_target_without_obstacles() {
        let mut config = RunConfig::default();
        config.obstacles.preview = false;
        let state = RunState::new(1, &config);

        assert_eq!(Autopilot::default().target_y(&state, &config), from_int(400));
    }

    #[test]
    fn test_target_follows_gap() {
        let config = RunConfig::default();
        let state = RunState::new(1, &config);
        let pilot = Autopilot::new(0, true);

        let lower_top = state
            .obstacles
            .values()
            .map(|o| o.bounds().top())
            .max()
            .unwrap();
        let expected = lower_top - (from_int(125) >> 1);
        assert_eq!(pilot.target_y(&state, &config), expected);
    }

    #[test]
    fn test_inputs_release_between_presses() {
        let config = RunConfig::default();
        let mut state = RunState::new(11, &config);
        let pilot = Autopilot::default();

        let mut prev = InputFrame::new();
        for _ in 0..2_000 {
            let input = pilot.next_input(&state, &config);
            assert!(!(prev.flap_down() && input.flap_down()), "flap held across frames");
            tick(&mut state, input, &config);
            prev = input;
        }
    }

    #[test]
    fn test_restarts_after_game_over() {
        let config = RunConfig::default();
        let mut state = RunState::new(11, &config);
        let pilot = Autopilot::default();

        tick(&mut state, InputFrame::flap(), &config);
        state.flyer.position.y = from_int(900);
        tick(&mut state, InputFrame::new(), &config);
        assert_eq!(state.phase, RunPhase::GameOver);

        for _ in 0..4 {
            let input = pilot.next_input(&state, &config);
            tick(&mut state, input, &config);
        }
        assert_ne!(state.phase, RunPhase::GameOver);
    }
}
