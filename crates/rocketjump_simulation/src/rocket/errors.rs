//! Ошибки rocket core (локальные, никогда не валят процесс)

use thiserror::Error;

use super::registry::RocketId;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RocketError {
    /// Aim direction нулевой или содержит NaN/inf — выстрел отклонён
    #[error("invalid aim direction {0:?}: expected a non-zero finite vector")]
    InvalidAimDirection([f32; 3]),

    /// Player body не найден в physics world (удалён или ещё не создан)
    #[error("player body is not present in the physics world")]
    PlayerMissing,

    #[error("unknown or already removed {0}")]
    UnknownRocket(RocketId),
}
