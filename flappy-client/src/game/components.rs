//! Components that mirror simulation entities on screen

use bevy::prelude::*;

// ============================================================================
// FLYER
// ============================================================================

/// Marker for the flyer sprite
#[derive(Component)]
pub struct FlyerSprite;

// ============================================================================
// OBSTACLES
// ============================================================================

/// Sprite for one live obstacle, keyed by its simulation id
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleSprite {
    pub id: u32,
}

// ============================================================================
// LAYERS
// ============================================================================

/// Z order for obstacles
pub const OBSTACLE_Z: f32 = 5.0;

/// Z order for the flyer (above obstacles)
pub const FLYER_Z: f32 = 10.0;
