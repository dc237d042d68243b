//! Checkpoint / respawn
//!
//! Hazard = статическое тело, касание которого телепортирует игрока:
//! - `Floor` — упал на пол уровня → назад на старт
//! - `Checkpoint` — стенки дыры → чекпоинт за ней
//! - `LevelExit` — дверь → старт следующего уровня
//!
//! Ракеты обрабатываются отдельно (`crate::rocket`), сюда приходят только
//! контакты со стороны игрока.

pub mod levels;

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::logger;
use crate::rocket::{BodyHandle, ContactEvent, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Floor,
    Checkpoint,
    LevelExit { next_level: u32 },
}

/// Hazard, прикреплённый к статическому телу (в ECS — компонент collider entity)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    pub kind: HazardKind,
    pub respawn_at: Vec3,
}

impl Hazard {
    pub fn floor(respawn_at: Vec3) -> Self {
        Self {
            kind: HazardKind::Floor,
            respawn_at,
        }
    }

    pub fn checkpoint(respawn_at: Vec3) -> Self {
        Self {
            kind: HazardKind::Checkpoint,
            respawn_at,
        }
    }

    pub fn level_exit(next_level: u32, respawn_at: Vec3) -> Self {
        Self {
            kind: HazardKind::LevelExit { next_level },
            respawn_at,
        }
    }

    /// Телепорт: движение сброшено (включая ещё не применённый knockback),
    /// position = respawn_at
    pub fn apply<W: PhysicsWorld>(&self, world: &mut W, player: BodyHandle) {
        world.reset_motion(player);
        world.set_position(player, self.respawn_at);
    }
}

/// Что произошло с игроком
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Respawn {
    pub kind: HazardKind,
    pub position: Vec3,
    /// Уровень после respawn
    pub level: u32,
}

/// body → hazard
#[derive(Resource, Debug)]
pub struct CheckpointMap {
    hazards: HashMap<BodyHandle, Hazard>,
    current_level: u32,
}

impl Default for CheckpointMap {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CheckpointMap {
    pub fn new(start_level: u32) -> Self {
        Self {
            hazards: HashMap::new(),
            current_level: start_level,
        }
    }

    pub fn register(&mut self, body: BodyHandle, hazard: Hazard) {
        self.hazards.insert(body, hazard);
    }

    pub fn unregister(&mut self, body: BodyHandle) -> Option<Hazard> {
        self.hazards.remove(&body)
    }

    pub fn hazard(&self, body: BodyHandle) -> Option<&Hazard> {
        self.hazards.get(&body)
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Контакт игрока с hazard'ом → respawn. Остальные контакты игнорируются.
    pub fn handle_contact<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        player: BodyHandle,
        event: ContactEvent,
    ) -> Option<Respawn> {
        if event.body != player {
            return None;
        }
        let hazard = *self.hazards.get(&event.other)?;

        hazard.apply(world, player);

        match hazard.kind {
            HazardKind::LevelExit { next_level } => {
                logger::log_info(&format!(
                    "🚪 Level {} → {}, player moved to {:?}",
                    self.current_level, next_level, hazard.respawn_at
                ));
                self.current_level = next_level;
            }
            kind => {
                logger::log(&format!("♻️ Player respawn ({:?}) at {:?}", kind, hazard.respawn_at));
            }
        }

        Some(Respawn {
            kind: hazard.kind,
            position: hazard.respawn_at,
            level: self.current_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{SandboxBody, SandboxWorld};

    fn setup() -> (SandboxWorld, BodyHandle, BodyHandle) {
        let mut world = SandboxWorld::new(Vec3::ZERO);
        let floor = world.add_static_box(Vec3::new(0.0, -1.0, 0.0), Vec3::new(10.0, 0.5, 10.0));
        let player = world.add_body(SandboxBody::dynamic_box(
            Vec3::new(3.0, 0.2, 0.0),
            Vec3::new(0.1, 1.0, 0.1),
            50.0,
        ));
        world.set_velocity(player, Vec3::new(1.0, -4.0, 0.0));
        (world, floor, player)
    }

    #[test]
    fn test_floor_contact_respawns_player() {
        let (mut world, floor, player) = setup();
        let mut map = CheckpointMap::default();
        map.register(floor, Hazard::floor(Vec3::new(0.0, 6.0, 73.0)));

        let respawn = map
            .handle_contact(
                &mut world,
                player,
                ContactEvent {
                    body: player,
                    other: floor,
                    local_point: Vec3::ZERO,
                },
            )
            .unwrap();

        assert_eq!(respawn.kind, HazardKind::Floor);
        assert_eq!(respawn.level, 1);
        assert_eq!(world.position(player), Some(Vec3::new(0.0, 6.0, 73.0)));
        assert_eq!(world.velocity(player), Some(Vec3::ZERO));
    }

    #[test]
    fn test_hazard_side_event_is_ignored() {
        let (mut world, floor, player) = setup();
        let mut map = CheckpointMap::default();
        map.register(floor, Hazard::floor(Vec3::ZERO));

        let event = ContactEvent {
            body: floor,
            other: player,
            local_point: Vec3::ZERO,
        };
        assert!(map.handle_contact(&mut world, player, event).is_none());
        assert_eq!(world.position(player), Some(Vec3::new(3.0, 0.2, 0.0)));
    }

    #[test]
    fn test_level_exit_advances_level() {
        let (mut world, door, player) = setup();
        let mut map = CheckpointMap::default();
        map.register(door, Hazard::level_exit(2, Vec3::new(200.0, 6.0, 73.0)));

        let respawn = map
            .handle_contact(
                &mut world,
                player,
                ContactEvent {
                    body: player,
                    other: door,
                    local_point: Vec3::ZERO,
                },
            )
            .unwrap();

        assert_eq!(respawn.level, 2);
        assert_eq!(map.current_level(), 2);
        assert_eq!(world.position(player), Some(Vec3::new(200.0, 6.0, 73.0)));
    }

    #[test]
    fn test_unregistered_body_is_not_a_hazard() {
        let (mut world, floor, player) = setup();
        let mut map = CheckpointMap::default();
        map.register(floor, Hazard::checkpoint(Vec3::ONE));
        map.unregister(floor);

        let event = ContactEvent {
            body: player,
            other: floor,
            local_point: Vec3::ZERO,
        };
        assert!(map.handle_contact(&mut world, player, event).is_none());
        assert!(map.is_empty());
    }
}
