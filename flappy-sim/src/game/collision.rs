//! Collision Detection
//!
//! Axis-aligned overlap tests between the flyer and the collision group,
//! plus the top/bottom world boundary test.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, from_int};
use crate::core::vec2::FixedVec2;
use crate::game::events::EndCause;
use crate::game::flyer::Flyer;
use crate::game::state::RunState;

/// Axis-aligned bounding box (y-down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: FixedVec2,
    /// Bottom-right corner
    pub max: FixedVec2,
}

impl Aabb {
    /// Box centred on `center` with the given full size.
    #[inline]
    pub fn from_center_size(center: FixedVec2, size: FixedVec2) -> Self {
        let half = size.half();
        Self {
            min: center - half,
            max: center - half + size,
        }
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> Fixed {
        self.min.y
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.max.y
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> Fixed {
        self.max.x
    }
}

/// First obstacle (lowest id) the flyer overlaps, if any.
pub fn flyer_hits_obstacle(state: &RunState) -> Option<u32> {
    let body = state.flyer.bounds();

    // BTreeMap iterates in id order
    state
        .obstacles
        .values()
        .find(|obstacle| obstacle.bounds().overlaps(&body))
        .map(|obstacle| obstacle.id)
}

/// Has the flyer crossed the top or bottom world boundary?
pub fn flyer_out_of_bounds(flyer: &Flyer, world_height: i32) -> bool {
    let body = flyer.bounds();
    body.top() < 0 || body.bottom() > from_int(world_height)
}

/// Check the run-ending conditions in order: obstacle first, then bounds.
pub fn detect_termination(state: &RunState, world_height: i32) -> Option<EndCause> {
    if let Some(obstacle_id) = flyer_hits_obstacle(state) {
        return Some(EndCause::Collision { obstacle_id });
    }

    if flyer_out_of_bounds(&state.flyer, world_height) {
        return Some(EndCause::OutOfBounds);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::core::fixed::to_fixed;
    use crate::game::obstacle::{Obstacle, ObstacleKind};

    fn aabb(x0: i32, y0: i32, x1: i32, y1: i32) -> Aabb {
        Aabb {
            min: FixedVec2::from_ints(x0, y0),
            max: FixedVec2::from_ints(x1, y1),
        }
    }

    #[test]
    fn test_from_center_size() {
        let b = Aabb::from_center_size(FixedVec2::from_ints(75, 400), FixedVec2::from_ints(30, 30));
        assert_eq!(b, aabb(60, 385, 90, 415));

        // Odd sizes keep the full extent
        let b = Aabb::from_center_size(FixedVec2::from_ints(0, 0), FixedVec2::from_ints(0, 375));
        assert_eq!(b.max.y - b.min.y, from_int(375));
    }

    #[test]
    fn test_overlap() {
        let a = aabb(0, 0, 10, 10);
        assert!(a.overlaps(&aabb(5, 5, 15, 15)));
        assert!(!a.overlaps(&aabb(20, 0, 30, 10)));

        // Touching edges do not collide
        assert!(!a.overlaps(&aabb(10, 0, 20, 10)));

        // Zero-height box never collides
        assert!(!aabb(0, 0, 50, 0).overlaps(&a));
    }

    #[test]
    fn test_out_of_bounds() {
        let config = RunConfig::default();
        let mut state = RunState::new(1, &config);

        assert!(!flyer_out_of_bounds(&state.flyer, 800));

        state.flyer.position.y = from_int(786); // bottom edge at 801
        assert!(flyer_out_of_bounds(&state.flyer, 800));

        state.flyer.position.y = from_int(785); // bottom edge exactly 800
        assert!(!flyer_out_of_bounds(&state.flyer, 800));

        state.flyer.position.y = to_fixed(14.5);
        assert!(flyer_out_of_bounds(&state.flyer, 800));
    }

    #[test]
    fn test_collision_wins_over_bounds() {
        let mut config = RunConfig::default();
        config.obstacles.preview = false;
        let mut state = RunState::new(1, &config);

        state.flyer.position.y = from_int(790);
        state.obstacles.insert(
            7,
            Obstacle::new(
                7,
                ObstacleKind::Lower,
                FixedVec2::from_ints(75, 700),
                FixedVec2::from_ints(50, 200),
                0,
            ),
        );

        assert_eq!(
            detect_termination(&state, 800),
            Some(EndCause::Collision { obstacle_id: 7 })
        );

        state.obstacles.clear();
        assert_eq!(detect_termination(&state, 800), Some(EndCause::OutOfBounds));
    }
}
