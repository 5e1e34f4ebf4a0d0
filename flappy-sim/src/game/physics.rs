//! Physics Step
//!
//! Euler integration of the flyer and the collision group over one fixed
//! tick, followed by culling of obstacles that scrolled off the left edge.

use crate::config::RunConfig;
use crate::core::fixed::{fixed_mul, from_int, TICK_DURATION};
use crate::core::vec2::FixedVec2;
use crate::game::events::RunEvent;
use crate::game::state::RunState;

/// Advance the world by one tick.
///
/// Gravity changes the flyer's velocity before the position update, so a
/// fresh flap already moves the flyer on the frame after it.
pub fn step_physics(state: &mut RunState, config: &RunConfig) {
    let flyer = &mut state.flyer;
    if flyer.gravity_enabled {
        let dv = fixed_mul(from_int(config.world.gravity), TICK_DURATION);
        flyer.velocity_y = flyer.velocity_y.saturating_add(dv);
    }
    let dy = fixed_mul(flyer.velocity_y, TICK_DURATION);
    flyer.position.y = flyer.position.y.saturating_add(dy);

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        tick = state.tick,
        y = flyer.position.y,
        vy = flyer.velocity_y,
        "flyer integrated"
    );

    // BTreeMap values_mut iterates in sorted order
    for obstacle in state.obstacles.values_mut() {
        let velocity = FixedVec2::new(obstacle.velocity_x, 0);
        obstacle.center = obstacle.center + velocity.scale(TICK_DURATION);
    }

    cull_obstacles(state);
}

/// Remove obstacles that are fully past the left edge.
///
/// Returns the number removed.
pub fn cull_obstacles(state: &mut RunState) -> u32 {
    let before = state.obstacles.len();
    state.obstacles.retain(|_, obstacle| !obstacle.is_off_screen());
    let culled = (before - state.obstacles.len()) as u32;

    if culled > 0 {
        let event = RunEvent::obstacles_culled(state.tick, culled);
        state.push_event(event);
    }

    culled
}
