//! RocketController — владелец всего состояния ракет
//!
//! Lifecycle одной ракеты: `SPAWNED → in-flight → IMPACTED → REMOVED`.
//!
//! Порядок вызовов на каждый fixed step (после интеграции physics world):
//! 1. `handle_contact` для каждого контакта этого step'а (impact → pending queue)
//! 2. `step`: fire (если trigger зажат) → drain всей pending queue (+ lifetime
//!    expiry) → lift force + sync drawable transforms для живых ракет
//!
//! Всё состояние (cooldown, реестр, очередь) — поля этой структуры, никаких
//! глобалов: несколько инстансов (тесты, несколько игр) полностью изолированы.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;

use super::errors::RocketError;
use super::firing::{FireCooldown, FireTrigger};
use super::impact::{classify, Detonation, ImpactOutcome, Knockback};
use super::ports::{BodyDesc, BodyHandle, ContactEvent, DrawableShape, PhysicsWorld, SceneGraph};
use super::registry::{RocketEntry, RocketId, RocketRegistry};
use super::spawn::{plan_launch, RocketLaunch};
use crate::config::RocketConfig;
use crate::logger;

/// Результат попытки выстрела в этом step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// Trigger не зажат
    Idle,
    /// Cooldown ещё не прошёл (попытка молча отброшена)
    CoolingDown,
    Spawned { rocket: RocketId, launch: RocketLaunch },
    Rejected(RocketError),
}

impl FireOutcome {
    pub fn spawned(&self) -> Option<RocketId> {
        match self {
            FireOutcome::Spawned { rocket, .. } => Some(*rocket),
            _ => None,
        }
    }
}

/// Что произошло за один `step`
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub fire: FireOutcome,
    /// Удалённые после impact
    pub removed: Vec<RocketId>,
    /// Удалённые по `max_lifetime` (без взрыва)
    pub expired: Vec<RocketId>,
}

#[derive(Resource, Debug)]
pub struct RocketController {
    config: RocketConfig,
    player: BodyHandle,
    player_extents: Vec3,
    trigger: FireTrigger,
    cooldown: FireCooldown,
    registry: RocketRegistry,
    pending_removal: VecDeque<RocketId>,
}

impl RocketController {
    pub fn new(config: RocketConfig, player: BodyHandle, player_extents: Vec3) -> Self {
        let cooldown = FireCooldown::new(config.fire_cooldown());
        Self {
            config,
            player,
            player_extents,
            trigger: FireTrigger::default(),
            cooldown,
            registry: RocketRegistry::new(),
            pending_removal: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &RocketConfig {
        &self.config
    }

    pub fn player(&self) -> BodyHandle {
        self.player
    }

    pub fn player_extents(&self) -> Vec3 {
        self.player_extents
    }

    /// Переключить controller на новое тело игрока (respawn через пересоздание body)
    pub fn set_player(&mut self, player: BodyHandle, player_extents: Vec3) {
        self.player = player;
        self.player_extents = player_extents;
    }

    pub fn trigger(&self) -> &FireTrigger {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut FireTrigger {
        &mut self.trigger
    }

    pub fn cooldown(&self) -> &FireCooldown {
        &self.cooldown
    }

    pub fn registry(&self) -> &RocketRegistry {
        &self.registry
    }

    pub fn live_rockets(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_removals(&self) -> usize {
        self.pending_removal.len()
    }

    pub fn rocket(&self, id: RocketId) -> Result<&RocketEntry, RocketError> {
        self.registry.get(id).ok_or(RocketError::UnknownRocket(id))
    }

    /// Один fixed step. Вызывать после интеграции world и `handle_contact`.
    pub fn step<W, S>(&mut self, world: &mut W, scene: &mut S, now: Duration, aim: Vec3) -> StepReport
    where
        W: PhysicsWorld,
        S: SceneGraph,
    {
        // 1. Fire
        let fire = if self.trigger.is_held() {
            self.try_fire(world, scene, now, aim)
        } else {
            FireOutcome::Idle
        };

        // 2. Removal: вся очередь, не одна ракета за step
        let mut removed = Vec::with_capacity(self.pending_removal.len());
        while let Some(id) = self.pending_removal.pop_front() {
            if self.despawn(world, scene, id) {
                removed.push(id);
            }
        }
        let expired = self.expire(world, scene, now);

        // 3. Lift + visual sync
        let lift = Vec3::Y * self.config.lift_force;
        for (_, entry) in self.registry.iter() {
            world.apply_force(entry.body, lift);

            let Some(position) = world.position(entry.body) else {
                continue;
            };
            let rotation = world.rotation(entry.body).unwrap_or(Quat::IDENTITY);
            scene.set_transform(entry.drawable, position, rotation);
        }

        StepReport {
            fire,
            removed,
            expired,
        }
    }

    /// Попытка выстрела (rate limited). `step` зовёт её сам, пока trigger зажат.
    pub fn try_fire<W, S>(&mut self, world: &mut W, scene: &mut S, now: Duration, aim: Vec3) -> FireOutcome
    where
        W: PhysicsWorld,
        S: SceneGraph,
    {
        if !self.cooldown.ready(now) {
            return FireOutcome::CoolingDown;
        }

        let Some(player_position) = world.position(self.player) else {
            logger::log_warning("Rocket fire rejected: player body missing");
            return FireOutcome::Rejected(RocketError::PlayerMissing);
        };

        let launch = match plan_launch(
            player_position,
            aim,
            self.player_extents,
            self.config.radius,
            self.config.spawn_clearance,
            self.config.launch_speed,
        ) {
            Ok(launch) => launch,
            Err(err) => {
                logger::log_warning(&format!("Rocket fire rejected: {}", err));
                return FireOutcome::Rejected(err);
            }
        };

        let body = world.create_body(BodyDesc {
            position: launch.position,
            velocity: launch.velocity,
            mass: self.config.mass,
            radius: self.config.radius,
            collision_response: false,
        });
        let drawable = scene.add_drawable(DrawableShape::Sphere {
            radius: self.config.radius,
        });
        scene.set_transform(drawable, launch.position, Quat::IDENTITY);

        let rocket = self.registry.insert(body, drawable, now);
        self.cooldown.commit(now);

        logger::log(&format!(
            "🚀 {} fired: pos={:?} vel={:?} (live: {})",
            rocket,
            launch.position,
            launch.velocity,
            self.registry.len()
        ));

        FireOutcome::Spawned { rocket, launch }
    }

    /// Обработать один нормализованный контакт
    ///
    /// Knockback применяется сразу, removal откладывается до `step`.
    /// Повторные контакты той же ракеты (в этом или следующих step'ах) — no-op.
    pub fn handle_contact<W: PhysicsWorld>(&mut self, world: &mut W, event: ContactEvent) -> ImpactOutcome {
        let Some(rocket) = self.registry.by_body(event.body) else {
            return ImpactOutcome::NotARocket;
        };
        let Some(entry) = self.registry.get(rocket) else {
            return ImpactOutcome::NotARocket;
        };

        let other_rocket = self.registry.by_body(event.other);
        if let Some(outcome) = classify(rocket, entry.impacted, event.other, self.player, other_rocket) {
            return outcome;
        }

        if let Some(entry) = self.registry.get_mut(rocket) {
            entry.impacted = true;
        }
        self.pending_removal.push_back(rocket);

        let (Some(rocket_position), Some(player_position)) =
            (world.position(event.body), world.position(self.player))
        else {
            logger::log_warning(&format!(
                "{} impacted but rocket/player body is gone, removal scheduled without knockback",
                rocket
            ));
            return ImpactOutcome::Orphaned(rocket);
        };

        let point = rocket_position + event.local_point;
        let knockback = Knockback::compute(
            player_position,
            point,
            self.config.strength_mult,
            self.config.falloff_distance,
        );

        if knockback.too_close {
            logger::log_warning(&format!(
                "{} detonated at player center {:?}, using max upward knockback",
                rocket, point
            ));
        }

        world.apply_impulse_at_center(self.player, knockback.impulse());

        logger::log(&format!(
            "💥 {} detonated at {:?}: distance={:.2} strength={:.2}",
            rocket, point, knockback.distance, knockback.strength
        ));

        ImpactOutcome::Detonated(Detonation {
            rocket,
            point,
            knockback,
        })
    }

    /// Удалить все ракеты (reset уровня)
    pub fn clear<W, S>(&mut self, world: &mut W, scene: &mut S) -> usize
    where
        W: PhysicsWorld,
        S: SceneGraph,
    {
        self.pending_removal.clear();
        let ids = self.registry.ids();
        ids.into_iter().filter(|id| self.despawn(world, scene, *id)).count()
    }

    fn expire<W, S>(&mut self, world: &mut W, scene: &mut S, now: Duration) -> Vec<RocketId>
    where
        W: PhysicsWorld,
        S: SceneGraph,
    {
        let Some(max_lifetime) = self.config.max_lifetime() else {
            return Vec::new();
        };

        let stale: Vec<RocketId> = self
            .registry
            .iter()
            .filter(|(_, entry)| !entry.impacted && now.saturating_sub(entry.spawned_at) >= max_lifetime)
            .map(|(id, _)| id)
            .collect();

        for id in &stale {
            logger::log_warning(&format!("{} expired without impact after {:?}", id, max_lifetime));
            self.despawn(world, scene, *id);
        }
        stale
    }

    fn despawn<W, S>(&mut self, world: &mut W, scene: &mut S, id: RocketId) -> bool
    where
        W: PhysicsWorld,
        S: SceneGraph,
    {
        let Some(entry) = self.registry.remove(id) else {
            return false;
        };

        world.remove_body(entry.body);
        scene.remove_drawable(entry.drawable);
        logger::log(&format!("🗑️ {} removed (live: {})", id, self.registry.len()));
        true
    }
}
