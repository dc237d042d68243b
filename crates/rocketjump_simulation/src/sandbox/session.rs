//! SandboxSession — весь game loop без Bevy
//!
//! Один `tick`:
//! 1. `world.step(dt)` → контакты
//! 2. контакты → `RocketController::handle_contact`, остальные → `CheckpointMap`
//! 3. `RocketController::step` (fire → removals → lift/sync)
//!
//! Тот же порядок, что у `RocketJumpPlugin` в FixedPostUpdate.

use std::time::Duration;

use bevy::prelude::*;

use crate::checkpoint::levels::LevelLayout;
use crate::checkpoint::{CheckpointMap, Respawn};
use crate::config::GameConfig;
use crate::rocket::{BodyHandle, Detonation, ImpactOutcome, PhysicsWorld, RocketController, StepReport};

use super::scene::SandboxScene;
use super::world::{SandboxBody, SandboxWorld};

/// Итог одного tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub step: StepReport,
    pub detonations: Vec<Detonation>,
    pub respawns: Vec<Respawn>,
    /// Сырых контактов (обе ориентации) за step
    pub contacts: usize,
}

#[derive(Debug)]
pub struct SandboxSession {
    world: SandboxWorld,
    scene: SandboxScene,
    rockets: RocketController,
    checkpoints: CheckpointMap,
    player: BodyHandle,
    aim: Vec3,
    timestep: Duration,
    elapsed: Duration,
    tick: u64,
}

impl SandboxSession {
    /// Пустой world + игрок в `config.player.spawn_position`
    pub fn new(config: &GameConfig) -> Self {
        let mut world = SandboxWorld::new(config.world.gravity());

        let extents = config.player.half_extents();
        let mut body = SandboxBody::dynamic_box(config.player.spawn(), extents, config.player.mass);
        body.linear_damping = config.player.linear_damping;
        let player = world.add_body(body);

        Self {
            world,
            scene: SandboxScene::new(),
            rockets: RocketController::new(config.rocket.clone(), player, extents),
            checkpoints: CheckpointMap::default(),
            player,
            aim: Vec3::NEG_Z,
            timestep: config.world.timestep(),
            elapsed: Duration::ZERO,
            tick: 0,
        }
    }

    /// Статические блоки уровня + hazards
    pub fn load_level(&mut self, layout: &LevelLayout) -> Vec<BodyHandle> {
        layout
            .blocks
            .iter()
            .map(|block| {
                let body = self.world.add_static_box(block.center, block.half_extents);
                if let Some(hazard) = block.hazard {
                    self.checkpoints.register(body, hazard);
                }
                body
            })
            .collect()
    }

    /// Поставить игрока в точку (без скорости)
    pub fn place_player(&mut self, position: Vec3) {
        self.world.set_velocity(self.player, Vec3::ZERO);
        self.world.set_position(self.player, position);
    }

    pub fn tick(&mut self) -> TickReport {
        let dt = self.timestep.as_secs_f32();
        let contacts = self.world.step(dt);
        self.elapsed += self.timestep;
        self.tick += 1;

        let mut detonations = Vec::new();
        let mut respawns = Vec::new();

        for contact in &contacts {
            match self.rockets.handle_contact(&mut self.world, *contact) {
                ImpactOutcome::Detonated(detonation) => detonations.push(detonation),
                ImpactOutcome::NotARocket => {
                    if let Some(respawn) = self.checkpoints.handle_contact(&mut self.world, self.player, *contact) {
                        respawns.push(respawn);
                    }
                }
                _ => {}
            }
        }

        let step = self
            .rockets
            .step(&mut self.world, &mut self.scene, self.elapsed, self.aim);

        TickReport {
            step,
            detonations,
            respawns,
            contacts: contacts.len(),
        }
    }

    /// `count` тиков подряд
    pub fn run(&mut self, count: usize) -> Vec<TickReport> {
        (0..count).map(|_| self.tick()).collect()
    }

    pub fn press_trigger(&mut self) {
        self.rockets.trigger_mut().press();
    }

    pub fn release_trigger(&mut self) {
        self.rockets.trigger_mut().release();
    }

    /// Пауза: input стрельбы игнорируется
    pub fn set_paused(&mut self, paused: bool) {
        self.rockets.trigger_mut().set_enabled(!paused);
    }

    pub fn set_aim(&mut self, aim: Vec3) {
        self.aim = aim;
    }

    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.world.position(self.player)
    }

    pub fn player_velocity(&self) -> Option<Vec3> {
        self.world.velocity(self.player)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SandboxWorld {
        &mut self.world
    }

    pub fn scene(&self) -> &SandboxScene {
        &self.scene
    }

    pub fn rockets(&self) -> &RocketController {
        &self.rockets
    }

    pub fn rockets_mut(&mut self) -> &mut RocketController {
        &mut self.rockets
    }

    pub fn checkpoints(&self) -> &CheckpointMap {
        &self.checkpoints
    }

    /// Снести все ракеты (reset уровня)
    pub fn clear_rockets(&mut self) -> usize {
        self.rockets.clear(&mut self.world, &mut self.scene)
    }
}
