//! Rocket launcher & knockback engine
//!
//! Engine-agnostic core: physics world и scene graph приходят снаружи через
//! `PhysicsWorld` / `SceneGraph` (Rapier адаптер в `crate::physics`,
//! deterministic sandbox в `crate::sandbox`).
//!
//! Содержит:
//! - RocketRegistry (generational ids, body + drawable в одной строке)
//! - FireTrigger / FireCooldown (rate limiting)
//! - spawn math (точка появления за collision box игрока)
//! - impact resolver (фильтры + linear falloff knockback)
//! - RocketController (lifecycle stepper)

pub mod controller;
pub mod errors;
pub mod events;
pub mod firing;
pub mod impact;
pub mod ports;
pub mod registry;
pub mod spawn;

#[cfg(test)]
mod controller_tests;

pub use controller::{FireOutcome, RocketController, StepReport};
pub use errors::RocketError;
pub use events::{RocketDetonated, RocketFired};
pub use firing::{FireCooldown, FireTrigger};
pub use impact::{knockback_strength, Detonation, ImpactOutcome, Knockback};
pub use ports::{BodyDesc, BodyHandle, ContactEvent, DrawableHandle, DrawableShape, PhysicsWorld, SceneGraph};
pub use registry::{RocketEntry, RocketId, RocketRegistry};
pub use spawn::{aim_direction, plan_launch, spawn_offset, RocketLaunch};
