use bevy::prelude::*;
use rocketjump_simulation::physics::{LevelBlock, RocketVisual};
use rocketjump_simulation::{log_info, Hazard, HazardKind, PlayerRespawned, RocketDetonated};

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            spawn_block_visuals,
            spawn_rocket_visuals,
            spawn_explosion_flashes,
            fade_explosion_flashes,
            log_respawns,
        ).chain());
    }
}

/// Вспышка взрыва: растёт и исчезает за `timer`
#[derive(Component)]
pub struct ExplosionFlash {
    pub timer: Timer,
    pub max_radius: f32,
}

/// Cuboid mesh для новых блоков уровня (цвет по hazard)
fn spawn_block_visuals(
    mut commands: Commands,
    query: Query<(Entity, &LevelBlock, Option<&Hazard>), Added<LevelBlock>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, block, hazard) in query.iter() {
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Cuboid::from_size(block.half_extents * 2.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: block_color(hazard.map(|h| h.kind)),
                ..default()
            })),
        ));
    }
}

/// Sphere mesh для drawable ракеты (transform пишет rocket core)
fn spawn_rocket_visuals(
    mut commands: Commands,
    query: Query<(Entity, &RocketVisual), Added<RocketVisual>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, visual) in query.iter() {
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Sphere::new(visual.radius))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.9, 0.9, 0.9),
                emissive: LinearRgba::rgb(2.0, 1.2, 0.4),
                ..default()
            })),
        ));
    }
}

fn spawn_explosion_flashes(
    mut commands: Commands,
    mut detonations: EventReader<RocketDetonated>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for detonation in detonations.read() {
        commands.spawn((
            ExplosionFlash {
                timer: Timer::from_seconds(0.25, TimerMode::Once),
                max_radius: 2.0 + detonation.strength / 50.0,
            },
            Mesh3d(meshes.add(Sphere::new(1.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 0.5, 0.1, 0.6),
                emissive: LinearRgba::rgb(4.0, 1.5, 0.2),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::from_translation(detonation.point).with_scale(Vec3::splat(0.1)),
        ));
    }
}

fn fade_explosion_flashes(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut ExplosionFlash, &mut Transform)>,
) {
    for (entity, mut flash, mut transform) in query.iter_mut() {
        flash.timer.tick(time.delta());
        if flash.timer.finished() {
            commands.entity(entity).despawn();
            continue;
        }
        transform.scale = Vec3::splat(flash.max_radius * flash.timer.fraction());
    }
}

fn log_respawns(mut respawns: EventReader<PlayerRespawned>) {
    for respawn in respawns.read() {
        if let HazardKind::LevelExit { next_level } = respawn.kind {
            log_info(&format!("Welcome to level {}", next_level));
        }
    }
}

/// Простая палитра: обычный блок / смерть / checkpoint / дверь
fn block_color(kind: Option<HazardKind>) -> Color {
    match kind {
        None => Color::srgb(0.55, 0.55, 0.6),
        Some(HazardKind::Floor) => Color::srgb(0.8, 0.2, 0.2),
        Some(HazardKind::Checkpoint) => Color::srgb(0.8, 0.5, 0.2),
        Some(HazardKind::LevelExit { .. }) => Color::srgb(0.2, 0.8, 0.3),
    }
}
