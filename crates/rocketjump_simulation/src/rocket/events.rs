//! Rocket events (ECS → presentation: звук выстрела, взрыв, VFX)

use bevy::prelude::*;

use super::registry::RocketId;

/// Event: ракета запущена
#[derive(Event, Debug, Clone)]
pub struct RocketFired {
    pub rocket: RocketId,
    pub position: Vec3,
    pub direction: Vec3,
}

/// Event: ракета взорвалась, knockback применён к игроку
#[derive(Event, Debug, Clone)]
pub struct RocketDetonated {
    pub rocket: RocketId,
    pub point: Vec3,
    pub impulse: Vec3,
    pub strength: f32,
}
