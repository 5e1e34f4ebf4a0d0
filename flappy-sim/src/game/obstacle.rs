//! Obstacle Spawning
//!
//! Obstacles come in pairs: an upper one hanging from the top edge down to
//! the gap and a lower one standing from the end of the gap to the bottom
//! edge. A repeating [`SpawnTimer`] drives pair creation while a run is
//! being played.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::config::RunConfig;
use crate::core::fixed::{Fixed, from_int};
use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::collision::Aabb;
use crate::game::events::RunEvent;
use crate::game::state::{RunPhase, RunState};

/// Obstacle tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Obstacle width
    pub width: i32,
    /// Vertical opening between the two obstacles of a pair
    pub gap_height: i32,
    /// Leftward scroll speed in units per second
    pub speed: i32,
    /// Wall-clock delay between spawns while playing
    pub spawn_interval_ms: u64,
    /// Place one pair at two-thirds of the world width before play starts
    pub preview: bool,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            width: 50,
            gap_height: 125,
            speed: 200,
            spawn_interval_ms: 1800,
            preview: true,
        }
    }
}

/// Which half of a pair an obstacle is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObstacleKind {
    /// Spans from the top edge to the gap start
    Upper = 0,
    /// Spans from the gap end to the bottom edge
    Lower = 1,
}

/// A live obstacle in the collision group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique obstacle ID (monotonic counter)
    pub id: u32,
    /// Upper or lower half of its pair
    pub kind: ObstacleKind,
    /// Centre of the rectangle
    pub center: FixedVec2,
    /// Full size of the rectangle
    pub size: FixedVec2,
    /// Horizontal velocity (negative is left)
    pub velocity_x: Fixed,
}

impl Obstacle {
    /// Create a new obstacle.
    pub fn new(id: u32, kind: ObstacleKind, center: FixedVec2, size: FixedVec2, velocity_x: Fixed) -> Self {
        Self {
            id,
            kind,
            center,
            size,
            velocity_x,
        }
    }

    /// Axis-aligned rectangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }

    /// Fully past the left edge of the world.
    pub fn is_off_screen(&self) -> bool {
        self.bounds().right() < 0
    }
}

// =============================================================================
// GAP GEOMETRY
// =============================================================================

/// Vertical layout of one obstacle pair, in whole units.
///
/// `upper_height + gap_height + lower_height == world_height` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapLayout {
    /// Top of the gap, measured from the top edge
    pub gap_start: i32,
    /// Height of the upper obstacle (equals `gap_start`)
    pub upper_height: i32,
    /// Height of the lower obstacle
    pub lower_height: i32,
}

impl GapLayout {
    /// Layout for a given gap start.
    ///
    /// The gap start is clamped into `[0, world_height - gap_height]` so the
    /// gap never leaves the world. Near-zero obstacle heights are allowed.
    pub fn from_gap_start(gap_start: i32, world_height: i32, gap_height: i32) -> Self {
        let max_start = (world_height - gap_height).max(0);
        let gap_start = gap_start.clamp(0, max_start);
        Self {
            gap_start,
            upper_height: gap_start,
            lower_height: world_height - gap_start - gap_height,
        }
    }

    /// Draw a gap start uniformly from `[0, world_height - gap_height)`.
    pub fn roll(rng: &mut DeterministicRng, world_height: i32, gap_height: i32) -> Self {
        let gap_start = rng.gap_start(world_height, gap_height);
        Self::from_gap_start(gap_start, world_height, gap_height)
    }
}

// =============================================================================
// SPAWN TIMER
// =============================================================================

/// Repeating, cancelable timer on simulation time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Delay between fires
    pub delay_ms: u64,
    /// Next fire time, `None` while stopped
    pub next_fire_ms: Option<u64>,
}

impl SpawnTimer {
    /// Stopped timer with the given delay.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_fire_ms: None,
        }
    }

    /// Start (or restart) so the first fire lands one delay after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_fire_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Stop without firing.
    pub fn cancel(&mut self) {
        self.next_fire_ms = None;
    }

    /// Is the timer running?
    pub fn is_active(&self) -> bool {
        self.next_fire_ms.is_some()
    }

    /// Number of fires due at `now_ms`; advances the schedule past them.
    pub fn poll(&mut self, now_ms: u64) -> u32 {
        let Some(mut next) = self.next_fire_ms else {
            return 0;
        };

        // A zero delay would never catch up
        let step = self.delay_ms.max(1);
        let mut fires = 0;
        while next <= now_ms {
            fires += 1;
            // Past the end of time the timer never fires again
            let Some(after) = next.checked_add(step) else {
                self.next_fire_ms = Some(u64::MAX);
                return fires;
            };
            next = after;
        }

        self.next_fire_ms = Some(next);
        fires
    }
}

// =============================================================================
// SPAWNING
// =============================================================================

/// Spawn one obstacle pair into the collision group.
///
/// Pairs spawned before the run starts sit at two-thirds of the world
/// width; all others are centred on the right edge.
pub fn spawn_pair(state: &mut RunState, config: &RunConfig) -> GapLayout {
    let world = &config.world;
    let cfg = &config.obstacles;

    let layout = GapLayout::roll(&mut state.rng, world.height, cfg.gap_height);

    let x = if state.phase == RunPhase::NotStarted {
        from_int(world.width * 2 / 3)
    } else {
        from_int(world.width)
    };
    let velocity_x = from_int(-cfg.speed);
    let width = from_int(cfg.width);

    let upper_height = from_int(layout.upper_height);
    let lower_height = from_int(layout.lower_height);

    let upper = Obstacle::new(
        state.next_obstacle_id(),
        ObstacleKind::Upper,
        FixedVec2::new(x, upper_height >> 1),
        FixedVec2::new(width, upper_height),
        velocity_x,
    );
    let lower = Obstacle::new(
        state.next_obstacle_id(),
        ObstacleKind::Lower,
        FixedVec2::new(x, from_int(world.height) - (lower_height >> 1)),
        FixedVec2::new(width, lower_height),
        velocity_x,
    );

    debug!(
        gap_start = layout.gap_start,
        upper = layout.upper_height,
        lower = layout.lower_height,
        "obstacle pair spawned"
    );

    let event = RunEvent::obstacles_spawned(state.tick, upper.id, lower.id, layout.gap_start, x);
    state.obstacles.insert(upper.id, upper);
    state.obstacles.insert(lower.id, lower);
    state.push_event(event);

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_layout_scenario() {
        let layout = GapLayout::from_gap_start(300, 800, 125);
        assert_eq!(layout.upper_height, 300);
        assert_eq!(layout.lower_height, 375);
    }

    #[test]
    fn test_gap_layout_clamped() {
        let top = GapLayout::from_gap_start(-20, 800, 125);
        assert_eq!(top.gap_start, 0);
        assert_eq!(top.upper_height, 0);
        assert_eq!(top.lower_height, 675);

        let bottom = GapLayout::from_gap_start(9000, 800, 125);
        assert_eq!(bottom.gap_start, 675);
        assert_eq!(bottom.lower_height, 0);
    }

    #[test]
    fn test_roll_in_range() {
        let mut rng = DeterministicRng::new(42);
        for _ in 0..2000 {
            let layout = GapLayout::roll(&mut rng, 800, 125);
            assert!(layout.gap_start >= 0 && layout.gap_start < 675);
            assert_eq!(layout.upper_height + 125 + layout.lower_height, 800);
        }
    }

    #[test]
    fn test_timer_repeats_and_cancels() {
        let mut timer = SpawnTimer::new(1800);
        assert_eq!(timer.poll(10_000), 0);

        timer.start(1000);
        assert!(timer.is_active());
        assert_eq!(timer.poll(2799), 0);
        assert_eq!(timer.poll(2800), 1);
        assert_eq!(timer.poll(2801), 0);
        assert_eq!(timer.poll(4600), 1);

        // Catch up after a long stall
        assert_eq!(timer.poll(8200), 2);

        timer.cancel();
        assert!(!timer.is_active());
        assert_eq!(timer.poll(100_000), 0);
    }

    #[test]
    fn test_timer_saturates_on_huge_delay() {
        let mut timer = SpawnTimer::new(u64::MAX);
        timer.start(1000);
        assert_eq!(timer.next_fire_ms, Some(u64::MAX));
        assert_eq!(timer.poll(1_000_000), 0);

        // A fire near the top of the range does not wrap around
        let mut timer = SpawnTimer::new(1800);
        timer.next_fire_ms = Some(u64::MAX - 10);
        assert_eq!(timer.poll(u64::MAX), 1);
        assert_eq!(timer.next_fire_ms, Some(u64::MAX));
    }

    #[test]
    fn test_spawn_pair_geometry() {
        let config = RunConfig::default();
        let mut state = RunState::new(7, &config);
        state.obstacles.clear();
        state.phase = RunPhase::Playing;

        let layout = spawn_pair(&mut state, &config);
        assert_eq!(state.obstacles.len(), 2);

        let upper = state.obstacles.values().find(|o| o.kind == ObstacleKind::Upper).unwrap();
        let lower = state.obstacles.values().find(|o| o.kind == ObstacleKind::Lower).unwrap();

        assert_eq!(upper.bounds().top(), 0);
        assert_eq!(upper.bounds().bottom(), from_int(layout.gap_start));
        assert_eq!(lower.bounds().top(), from_int(layout.gap_start + 125));
        assert_eq!(lower.bounds().bottom(), from_int(800));

        assert_eq!(upper.center.x, from_int(480));
        assert_eq!(upper.velocity_x, from_int(-200));
        assert_eq!(lower.velocity_x, from_int(-200));
    }

    #[test]
    fn test_preview_pair_at_two_thirds() {
        let config = RunConfig::default();
        let state = RunState::new(7, &config);

        assert_eq!(state.phase, RunPhase::NotStarted);
        assert_eq!(state.obstacles.len(), 2);
        for obstacle in state.obstacles.values() {
            assert_eq!(obstacle.center.x, from_int(320));
        }
    }

    #[test]
    fn test_off_screen() {
        let mut obstacle = Obstacle::new(
            0,
            ObstacleKind::Upper,
            FixedVec2::from_ints(-24, 100),
            FixedVec2::from_ints(50, 200),
            0,
        );
        assert!(!obstacle.is_off_screen());

        obstacle.center.x = from_int(-26);
        assert!(obstacle.is_off_screen());
    }
}
