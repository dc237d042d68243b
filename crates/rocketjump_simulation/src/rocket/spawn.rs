//! Projectile spawn: точка появления и начальная скорость
//!
//! Ракета появляется сразу за collision box игрока:
//! `spawn = p + d ⊙ (extents × clearance + radius)` — per-axis, каждая ось
//! использует свой half-extent, так что для любого aim direction ракета не
//! пересекается с телом, которое её выпустило.

use bevy::prelude::*;

use super::errors::RocketError;

/// Результат планирования запуска
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketLaunch {
    pub position: Vec3,
    pub velocity: Vec3,
    pub direction: Vec3,
}

/// Нормализует aim direction; нулевой / NaN вектор → `InvalidAimDirection`
pub fn aim_direction(raw: Vec3) -> Result<Vec3, RocketError> {
    raw.try_normalize()
        .ok_or(RocketError::InvalidAimDirection(raw.to_array()))
}

/// Offset от центра игрока до центра ракеты
pub fn spawn_offset(direction: Vec3, player_extents: Vec3, radius: f32, clearance: f32) -> Vec3 {
    direction * (player_extents * clearance + Vec3::splat(radius))
}

/// Полный план запуска из позиции игрока и сырого aim
pub fn plan_launch(
    player_position: Vec3,
    raw_aim: Vec3,
    player_extents: Vec3,
    radius: f32,
    clearance: f32,
    launch_speed: f32,
) -> Result<RocketLaunch, RocketError> {
    let direction = aim_direction(raw_aim)?;

    Ok(RocketLaunch {
        position: player_position + spawn_offset(direction, player_extents, radius, clearance),
        velocity: direction * launch_speed,
        direction,
    })
}
