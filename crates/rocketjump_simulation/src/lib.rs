//! Rocketjump Simulation Core
//!
//! Rocket launcher & knockback engine для FPS rocket-jump платформера.
//!
//! Слои:
//! - `rocket` — engine-agnostic core (firing, spawn, impact, lifecycle)
//! - `checkpoint` — hazards / respawn / переход между уровнями
//! - `sandbox` — детерминированный reference physics world (headless, тесты)
//! - `physics` — Bevy/Rapier адаптер (`RocketJumpPlugin`)

use bevy::prelude::*;

// Публичные модули
pub mod checkpoint;
pub mod config;
pub mod logger;
pub mod physics;
pub mod rocket;
pub mod sandbox;

// Re-export основных типов
pub use checkpoint::{CheckpointMap, Hazard, HazardKind, Respawn};
pub use config::{ConfigError, GameConfig, PlayerConfig, RocketConfig, WorldConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{Player, PlayerAim, PlayerRespawned, RocketJumpPlugin};
pub use rocket::{
    knockback_strength, BodyHandle, ContactEvent, FireOutcome, ImpactOutcome, PhysicsWorld, RocketController,
    RocketDetonated, RocketError, RocketFired, RocketId, SceneGraph, StepReport,
};
pub use sandbox::{SandboxSession, SandboxWorld};

/// Главный plugin симуляции: fixed timestep + config + rocket/checkpoint системы
pub struct SimulationPlugin {
    pub config: GameConfig,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        init_logger();
        if let Some(level) = self.config.log_level() {
            set_log_level(level);
        }

        app
            // Fixed timestep (60Hz по умолчанию) для physics + rocket step
            .insert_resource(Time::<Fixed>::from_hz(self.config.world.timestep_hz))
            .insert_resource(self.config.clone())
            .add_plugins(RocketJumpPlugin);
    }
}

/// Создаёт minimal Bevy App для headless прогона (без Rapier и рендера)
pub fn create_headless_app(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin { config });

    app
}
