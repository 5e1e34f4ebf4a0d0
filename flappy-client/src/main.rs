//! Flappy 2D - side-scrolling flyer
//!
//! Flap through gaps in an endless stream of obstacle pairs. The run is
//! simulated by the deterministic `flappy` core; this crate only feeds it
//! keyboard state and draws what it reports.

mod game;
mod ui;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use flappy::WorldConfig;

use game::GamePlugin;
use ui::UiPlugin;

/// Scene states, mirrored from the simulation's run phase
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    NotStarted,
    Playing,
    GameOver,
}

fn main() {
    let world = WorldConfig::default();

    App::new()
        // Bevy defaults with a window the size of the world
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Flappy".into(),
                resolution: WindowResolution::new(world.width as f32, world.height as f32),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        // Scene state
        .init_state::<AppState>()
        // Our plugins
        .add_plugins((GamePlugin, UiPlugin))
        // Startup
        .add_systems(Startup, setup_2d_camera)
        .run();
}

/// 2D camera centred on the world
fn setup_2d_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.45, 0.75, 0.95)), // Sky blue
            ..default()
        },
    ));

    info!("Flappy 2D initialized!");
}
