//! UI module - score HUD, start hint and game over overlay

use bevy::prelude::*;
use crate::AppState;
use crate::game::ActiveRun;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_systems(Startup, setup_hud)
            .add_systems(OnEnter(AppState::NotStarted), setup_start_hint)
            .add_systems(OnExit(AppState::NotStarted), cleanup_start_hint)
            .add_systems(OnEnter(AppState::GameOver), setup_game_over)
            .add_systems(OnExit(AppState::GameOver), cleanup_game_over)
            .add_systems(Update, update_score_text);
    }
}

/// Marker for the score text
#[derive(Component)]
struct ScoreText;

/// Marker for the start hint
#[derive(Component)]
struct StartHintUI;

/// Marker for the game over overlay
#[derive(Component)]
struct GameOverUI;

/// Score label as shown on screen
pub fn score_label(score: u32) -> String {
    format!("Score: {}", score)
}

/// Setup score HUD (top left, always visible)
fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        },
    )).with_children(|parent| {
        parent.spawn((
            Text::new(score_label(0)),
            TextFont {
                font_size: 32.0,
                ..default()
            },
            TextColor(Color::BLACK),
            ScoreText,
        ));
    });
}

/// Refresh the score text when it changes
fn update_score_text(
    run: Res<ActiveRun>,
    mut query: Query<&mut Text, With<ScoreText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };

    let label = score_label(run.state.score);
    if **text != label {
        **text = label;
    }
}

/// Setup start hint
fn setup_start_hint(mut commands: Commands) {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::End,
            padding: UiRect::bottom(Val::Px(120.0)),
            ..default()
        },
        StartHintUI,
    )).with_children(|parent| {
        parent.spawn((
            Text::new("Press SPACE to flap"),
            TextFont {
                font_size: 24.0,
                ..default()
            },
            TextColor(Color::srgb(0.1, 0.1, 0.2)),
        ));
    });
}

fn cleanup_start_hint(
    mut commands: Commands,
    query: Query<Entity, With<StartHintUI>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Setup game over overlay
fn setup_game_over(mut commands: Commands, run: Res<ActiveRun>) {
    info!("Game Over! Score {}", run.state.score);

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        GameOverUI,
    )).with_children(|parent| {
        parent.spawn((
            Text::new("GAME OVER"),
            TextFont {
                font_size: 64.0,
                ..default()
            },
            TextColor(Color::srgb(1.0, 0.3, 0.3)),
            Node {
                margin: UiRect::bottom(Val::Px(20.0)),
                ..default()
            },
        ));

        parent.spawn((
            Text::new(score_label(run.state.score)),
            TextFont {
                font_size: 32.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                margin: UiRect::bottom(Val::Px(40.0)),
                ..default()
            },
        ));

        parent.spawn((
            Text::new("Press ENTER to restart"),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(Color::srgb(0.8, 0.8, 0.85)),
        ));
    });
}

fn cleanup_game_over(
    mut commands: Commands,
    query: Query<Entity, With<GameOverUI>>,
) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
