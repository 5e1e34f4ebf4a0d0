//! Visuals - mirror the simulation into sprites
//!
//! The simulation is y-down with its origin at the top-left corner of the
//! world; the camera is centred with y up.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use flappy::core::fixed::to_float;
use flappy::{FixedVec2, WorldConfig};

use super::{ActiveRun, FlyerSprite, ObstacleSprite, FLYER_Z, OBSTACLE_Z};

// ============================================================================
// COORDINATES
// ============================================================================

/// World position to screen position
pub fn world_to_screen(position: FixedVec2, world: &WorldConfig) -> Vec2 {
    Vec2::new(
        to_float(position.x) - world.width as f32 / 2.0,
        world.height as f32 / 2.0 - to_float(position.y),
    )
}

/// Flyer tilt (positive is nose down) as a sprite rotation
pub fn tilt_rotation(tilt_degrees: i32) -> Quat {
    Quat::from_rotation_z(-(tilt_degrees as f32).to_radians())
}

// ============================================================================
// SETUP
// ============================================================================

/// Size the window to the configured world
pub fn fit_window(run: Res<ActiveRun>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };

    let world = &run.config.world;
    window.resolution.set(world.width as f32, world.height as f32);
}

/// Spawn the flyer sprite
pub fn spawn_flyer(mut commands: Commands, run: Res<ActiveRun>) {
    let flyer = &run.state.flyer;
    let (w, h) = flyer.size.to_floats();
    let position = world_to_screen(flyer.position, &run.config.world);

    commands.spawn((
        FlyerSprite,
        Name::new("Flyer"),
        Sprite {
            color: Color::srgb(1.0, 0.85, 0.2), // Yellow
            custom_size: Some(Vec2::new(w, h)),
            ..default()
        },
        Transform::from_translation(position.extend(FLYER_Z)),
    ));

    info!("Flyer spawned at {:?}", position);
}

// ============================================================================
// SYNC
// ============================================================================

/// Move and rotate the flyer sprite to match the simulation
pub fn sync_flyer_sprite(
    run: Res<ActiveRun>,
    mut query: Query<&mut Transform, With<FlyerSprite>>,
) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };

    let flyer = &run.state.flyer;
    let position = world_to_screen(flyer.position, &run.config.world);
    transform.translation = position.extend(FLYER_Z);
    transform.rotation = tilt_rotation(flyer.tilt_degrees);
}

/// Keep one sprite per live obstacle
pub fn sync_obstacle_sprites(
    mut commands: Commands,
    run: Res<ActiveRun>,
    mut query: Query<(Entity, &ObstacleSprite, &mut Transform)>,
) {
    let world = &run.config.world;
    let obstacles = &run.state.obstacles;

    // Update or despawn existing sprites
    let mut shown = Vec::new();
    for (entity, sprite, mut transform) in query.iter_mut() {
        match obstacles.get(&sprite.id) {
            Some(obstacle) => {
                let position = world_to_screen(obstacle.center, world);
                transform.translation = position.extend(OBSTACLE_Z);
                shown.push(sprite.id);
            }
            None => commands.entity(entity).despawn(),
        }
    }

    // Spawn sprites for new obstacles
    for obstacle in obstacles.values().filter(|o| !shown.contains(&o.id)) {
        let (w, h) = obstacle.size.to_floats();
        let position = world_to_screen(obstacle.center, world);

        commands.spawn((
            ObstacleSprite { id: obstacle.id },
            Sprite {
                color: Color::srgb(0.3, 0.75, 0.3), // Pipe green
                custom_size: Some(Vec2::new(w, h)),
                ..default()
            },
            Transform::from_translation(position.extend(OBSTACLE_Z)),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy::{RunConfig, RunState};

    #[test]
    fn test_world_to_screen() {
        let world = WorldConfig::default();

        assert_eq!(world_to_screen(FixedVec2::from_ints(0, 0), &world), Vec2::new(-240.0, 400.0));
        assert_eq!(world_to_screen(FixedVec2::from_ints(240, 400), &world), Vec2::ZERO);
        assert_eq!(world_to_screen(FixedVec2::from_ints(75, 800), &world), Vec2::new(-165.0, -400.0));
    }

    #[test]
    fn test_tilt_rotation() {
        let nose_down = tilt_rotation(30);
        let (_, angle) = nose_down.to_axis_angle();
        assert!((angle - 30f32.to_radians()).abs() < 1e-5);

        // Nose down turns clockwise on screen
        let ahead = nose_down * Vec3::X;
        assert!(ahead.y < 0.0);

        assert_eq!(tilt_rotation(0), Quat::IDENTITY);
    }

    #[test]
    fn test_obstacle_sprites_follow_state() {
        let config = RunConfig::default();
        let state = RunState::new(3, &config);

        let mut app = App::new();
        app.insert_resource(ActiveRun { state, config })
            .add_systems(Update, sync_obstacle_sprites);

        let mut sprites = app.world_mut().query::<&ObstacleSprite>();

        app.world_mut().run_schedule(Update);
        let count = sprites.iter(app.world()).count();
        assert_eq!(count, 2);

        // Clearing the collision group removes the sprites
        app.world_mut().resource_mut::<ActiveRun>().state.obstacles.clear();
        app.world_mut().run_schedule(Update);
        let count = sprites.iter(app.world()).count();
        assert_eq!(count, 0);
    }
}
