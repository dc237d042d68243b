//! Gameplay tuning (rocket launcher, player body, physics world)
//!
//! Defaults = значения из shipped версии игры. Любое поле можно переопределить
//! из TOML файла, отсутствующие поля берутся из `Default`.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки загрузки/валидации конфига
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Rocket launcher + knockback tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    /// Минимальный интервал между принятыми выстрелами (ms)
    pub fire_cooldown_ms: u64,
    /// Скорость ракеты при запуске (units/s)
    pub launch_speed: f32,
    /// Сила knockback на дистанции 0
    pub strength_mult: f32,
    /// Дистанция, на которой knockback падает до нуля
    pub falloff_distance: f32,
    /// Радиус сферы ракеты
    pub radius: f32,
    /// Масса тела ракеты
    pub mass: f32,
    /// Постоянная сила вверх каждый step (компенсирует гравитацию)
    pub lift_force: f32,
    /// Множитель player extents при расчёте точки spawn
    pub spawn_clearance: f32,
    /// Safety despawn для ракет, которые ни во что не попали (None = живут до impact)
    pub max_lifetime_ms: Option<u64>,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            fire_cooldown_ms: 800,
            launch_speed: 28.0,
            strength_mult: 110.0,
            falloff_distance: 5.0,
            radius: 0.2,
            mass: 1.0,
            lift_force: 20.0,
            spawn_clearance: 1.5,
            max_lifetime_ms: None,
        }
    }
}

impl RocketConfig {
    pub fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("rocket.launch_speed", self.launch_speed)?;
        positive("rocket.falloff_distance", self.falloff_distance)?;
        positive("rocket.radius", self.radius)?;
        positive("rocket.mass", self.mass)?;
        non_negative("rocket.strength_mult", self.strength_mult)?;
        non_negative("rocket.spawn_clearance", self.spawn_clearance)?;
        if !self.lift_force.is_finite() {
            return Err(ConfigError::Invalid {
                field: "rocket.lift_force",
                reason: "must be finite".to_string(),
            });
        }
        if self.max_lifetime_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "rocket.max_lifetime_ms",
                reason: "must be > 0 (omit to disable)".to_string(),
            });
        }
        Ok(())
    }
}

/// Player body
///
/// `width`/`height`/`depth` — half-extents collision box'а (как в cuboid shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub spawn_position: [f32; 3],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 0.1,
            height: 1.0,
            depth: 0.1,
            mass: 50.0,
            linear_damping: 0.9,
            spawn_position: [0.0, 5.0, 0.0],
        }
    }
}

impl PlayerConfig {
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    pub fn spawn(&self) -> Vec3 {
        Vec3::from_array(self.spawn_position)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("player.width", self.width)?;
        positive("player.height", self.height)?;
        positive("player.depth", self.depth)?;
        positive("player.mass", self.mass)?;
        non_negative("player.linear_damping", self.linear_damping)
    }
}

/// Physics world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f32; 3],
    /// Fixed timestep (Hz)
    pub timestep_hz: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -20.0, 0.0],
            timestep_hz: 60.0,
        }
    }
}

impl WorldConfig {
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    pub fn timestep(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.timestep_hz)
    }
}

/// Полный конфиг игры (Resource в ECS)
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rocket: RocketConfig,
    pub player: PlayerConfig,
    pub world: WorldConfig,
    /// "debug" | "info" | "warning" | "error"
    pub log_level: Option<String>,
}

impl GameConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rocket.validate()?;
        self.player.validate()?;
        if !(self.world.timestep_hz.is_finite() && self.world.timestep_hz > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world.timestep_hz",
                reason: format!("must be > 0, got {}", self.world.timestep_hz),
            });
        }
        if let Some(level) = &self.log_level {
            if crate::logger::LogLevel::parse(level).is_none() {
                return Err(ConfigError::Invalid {
                    field: "log_level",
                    reason: format!("unknown level `{}`", level),
                });
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<crate::logger::LogLevel> {
        self.log_level.as_deref().and_then(crate::logger::LogLevel::parse)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be > 0, got {}", value),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be >= 0, got {}", value),
        })
    }
}
