//! Deterministic sandbox: reference `PhysicsWorld` + `SceneGraph`
//!
//! Используется headless binary и тестами. Никакой многопоточности и
//! случайности: одинаковый вход → бит-в-бит одинаковый результат.

pub mod scene;
pub mod session;
pub mod world;

pub use scene::{SandboxDrawable, SandboxScene};
pub use session::{SandboxSession, TickReport};
pub use world::{BodyKind, SandboxBody, SandboxWorld, Shape};
