use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rocketjump_simulation::checkpoint::levels;
use rocketjump_simulation::physics::{spawn_level, spawn_player};
use rocketjump_simulation::{log_error, GameConfig, SimulationPlugin};

mod camera;
mod input;
mod rendering;

use camera::CameraPlugin;
use input::ControlsPlugin;
use rendering::RenderingSyncPlugin;

fn main() {
    // Первый аргумент: путь к TOML конфигу (иначе defaults)
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).unwrap_or_else(|err| {
            log_error(&format!("Failed to load config {}: {}, using defaults", path, err));
            GameConfig::default()
        }),
        None => GameConfig::default(),
    };

    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Rocketjump".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Rapier в том же fixed timestep, что и rocket step
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        // Simulation (rocket core + hazards)
        .add_plugins(SimulationPlugin { config })
        // Rendering sync (simulation → visuals)
        .add_plugins(RenderingSyncPlugin)
        // FPS камера + aim
        .add_plugins(CameraPlugin)
        // Mouse / keyboard → trigger
        .add_plugins(ControlsPlugin)
        .add_systems(Startup, setup_scene)
        .run();
}

/// Все уровни, игрок на старте level 1, свет и камера
fn setup_scene(mut commands: Commands, config: Res<GameConfig>) {
    for layout in levels::all() {
        spawn_level(&mut commands, &layout);
    }
    let player = spawn_player(&mut commands, &config.player, levels::LEVEL1_START);

    // Directional light (sun)
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_4)),
    ));

    // Ambient light
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            ..default()
        }),
        Transform::from_translation(levels::LEVEL1_START),
        camera::FirstPersonCamera {
            target: player,
            ..default()
        },
    ));
}
