//! Bevy/Rapier интеграция rocket core
//!
//! Rapier крутится в FixedPostUpdate (`RapierPhysicsPlugin::in_fixed_schedule`),
//! наши системы идут сразу после `PhysicsSet::Writeback`, когда Transform /
//! Velocity уже отражают только что посчитанный step:
//!
//! ```text
//! process_rocket_contacts → process_hazard_contacts → step_rockets
//! ```
//!
//! Сам Rapier plugin добавляет клиент (headless тесты крутят sandbox world).

pub mod rapier;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::checkpoint::levels::{LevelLayout, StaticBlock};
use crate::checkpoint::{CheckpointMap, Hazard, HazardKind};
use crate::config::{GameConfig, PlayerConfig};
use crate::logger;
use crate::rocket::{FireOutcome, ImpactOutcome, PhysicsWorld, RocketController, RocketDetonated, RocketFired};

pub use rapier::{
    body_entity, body_handle, normalize_collision, sensor_contact_point, EcsScene, RapierWorld, RocketBody, RocketVisual,
};

/// Игрок (тело, из которого стреляем)
#[derive(Component, Debug, Clone, Copy)]
pub struct Player {
    pub half_extents: Vec3,
}

/// Куда смотрит игрок (пишет клиент из камеры)
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerAim {
    pub direction: Vec3,
}

impl Default for PlayerAim {
    fn default() -> Self {
        Self {
            direction: Vec3::NEG_Z,
        }
    }
}

/// Статический блок уровня
#[derive(Component, Debug, Clone)]
pub struct LevelBlock {
    pub level: u32,
    pub label: &'static str,
    pub half_extents: Vec3,
}

/// Event: игрок телепортирован hazard'ом
#[derive(Event, Debug, Clone)]
pub struct PlayerRespawned {
    pub kind: HazardKind,
    pub position: Vec3,
    pub level: u32,
}

pub struct RocketJumpPlugin;

impl Plugin for RocketJumpPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<CheckpointMap>()
            .add_event::<RocketFired>()
            .add_event::<RocketDetonated>()
            .add_event::<PlayerRespawned>()
            // Без RapierPhysicsPlugin (headless) событий просто не будет
            .add_event::<CollisionEvent>()
            // Hazard table живёт по lifecycle компонента, не по fixed tick'ам
            .add_observer(register_hazard)
            .add_observer(unregister_hazard)
            .add_systems(PostStartup, apply_world_gravity)
            .add_systems(
                FixedPostUpdate,
                (
                    attach_rocket_controller,
                    process_rocket_contacts,
                    process_hazard_contacts,
                    step_rockets,
                )
                    .chain()
                    .after(PhysicsSet::Writeback),
            );
    }
}

/// Gravity из конфига в каждый Rapier context
pub fn apply_world_gravity(mut contexts: Query<&mut RapierConfiguration>, config: Res<GameConfig>) {
    for mut rapier in contexts.iter_mut() {
        rapier.gravity = config.world.gravity();
    }
}

/// Новый `Hazard` компонент → CheckpointMap
pub fn register_hazard(trigger: Trigger<OnAdd, Hazard>, hazards: Query<&Hazard>, mut checkpoints: ResMut<CheckpointMap>) {
    let entity = trigger.target();
    if let Ok(hazard) = hazards.get(entity) {
        checkpoints.register(body_handle(entity), *hazard);
    }
}

/// Hazard снят или entity despawn'нут → убрать из CheckpointMap
pub fn unregister_hazard(trigger: Trigger<OnRemove, Hazard>, mut checkpoints: ResMut<CheckpointMap>) {
    checkpoints.unregister(body_handle(trigger.target()));
}

/// Появился игрок → RocketController (или переключить существующий на новое тело)
pub fn attach_rocket_controller(
    mut commands: Commands,
    players: Query<(Entity, &Player), Added<Player>>,
    config: Res<GameConfig>,
    controller: Option<ResMut<RocketController>>,
) {
    let Some((entity, player)) = players.iter().next() else {
        return;
    };

    match controller {
        Some(mut controller) => {
            controller.set_player(body_handle(entity), player.half_extents);
            logger::log_info(&format!("RocketController switched to player {:?}", entity));
        }
        None => {
            commands.insert_resource(RocketController::new(
                config.rocket.clone(),
                body_handle(entity),
                player.half_extents,
            ));
            logger::log_info(&format!("RocketController attached to player {:?}", entity));
        }
    }
}

pub fn process_rocket_contacts(
    controller: Option<ResMut<RocketController>>,
    mut collisions: EventReader<CollisionEvent>,
    mut world: RapierWorld,
    colliders: Query<(&Collider, &GlobalTransform)>,
    mut detonated: EventWriter<RocketDetonated>,
) {
    let Some(mut controller) = controller else {
        collisions.clear();
        return;
    };
    world.sync_pending();
    let radius = controller.config().radius;

    for mut contact in collisions.read().filter_map(normalize_collision).flatten() {
        // Sensor без manifold: точку контакта считаем сами
        if controller.registry().is_rocket_body(contact.body) {
            let center = world.position(contact.body);
            let other = body_entity(contact.other).and_then(|entity| colliders.get(entity).ok());
            if let (Some(center), Some((collider, transform))) = (center, other) {
                contact.local_point = sensor_contact_point(center, radius, collider, transform);
            }
        }

        if let ImpactOutcome::Detonated(detonation) = controller.handle_contact(&mut world, contact) {
            detonated.write(RocketDetonated {
                rocket: detonation.rocket,
                point: detonation.point,
                impulse: detonation.impulse(),
                strength: detonation.knockback.strength,
            });
        }
    }
}

pub fn process_hazard_contacts(
    mut collisions: EventReader<CollisionEvent>,
    mut checkpoints: ResMut<CheckpointMap>,
    players: Query<Entity, With<Player>>,
    mut world: RapierWorld,
    mut respawned: EventWriter<PlayerRespawned>,
) {
    let Some(player) = players.iter().next().map(body_handle) else {
        collisions.clear();
        return;
    };
    world.sync_pending();

    for contact in collisions.read().filter_map(normalize_collision).flatten() {
        if let Some(respawn) = checkpoints.handle_contact(&mut world, player, contact) {
            respawned.write(PlayerRespawned {
                kind: respawn.kind,
                position: respawn.position,
                level: respawn.level,
            });
        }
    }
}

pub fn step_rockets(
    controller: Option<ResMut<RocketController>>,
    mut world: RapierWorld,
    mut scene: EcsScene,
    aims: Query<&PlayerAim, With<Player>>,
    time: Res<Time<Fixed>>,
    mut fired: EventWriter<RocketFired>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    world.sync_pending();

    let aim = aims.iter().next().map(|aim| aim.direction).unwrap_or(Vec3::NEG_Z);
    let report = controller.step(&mut world, &mut scene, time.elapsed(), aim);

    if let FireOutcome::Spawned { rocket, launch } = report.fire {
        fired.write(RocketFired {
            rocket,
            position: launch.position,
            direction: launch.direction,
        });
    }
}

/// Dynamic box игрока (rotation залочен, impulse/velocity управляются core)
pub fn spawn_player(commands: &mut Commands, config: &PlayerConfig, position: Vec3) -> Entity {
    let half = config.half_extents();

    commands
        .spawn((
            Name::new("Player"),
            Player { half_extents: half },
            PlayerAim::default(),
            Transform::from_translation(position),
            RigidBody::Dynamic,
            Collider::cuboid(half.x, half.y, half.z),
            ColliderMassProperties::Density(0.0),
            AdditionalMassProperties::Mass(config.mass),
            Damping {
                linear_damping: config.linear_damping,
                angular_damping: 0.0,
            },
            LockedAxes::ROTATION_LOCKED,
            Velocity::zero(),
            ExternalImpulse::default(),
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id()
}

/// Fixed cuboid блока (+ Hazard, если есть)
pub fn spawn_static_block(commands: &mut Commands, level: u32, block: &StaticBlock) -> Entity {
    let half = block.half_extents;
    let mut entity = commands.spawn((
        Name::new(block.label),
        LevelBlock {
            level,
            label: block.label,
            half_extents: half,
        },
        Transform::from_translation(block.center),
        RigidBody::Fixed,
        Collider::cuboid(half.x, half.y, half.z),
    ));
    if let Some(hazard) = block.hazard {
        entity.insert(hazard);
    }
    entity.id()
}

pub fn spawn_level(commands: &mut Commands, layout: &LevelLayout) -> Vec<Entity> {
    logger::log_info(&format!("Loading {} ({} blocks)", layout.name, layout.blocks.len()));
    layout
        .blocks
        .iter()
        .map(|block| spawn_static_block(commands, layout.id, block))
        .collect()
}
