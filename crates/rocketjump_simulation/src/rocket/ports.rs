//! Контракты внешних коллабораторов: physics world + scene graph
//!
//! Core не знает, кто стоит за handle'ами (Rapier entity, sandbox index, ...).
//! Адаптеры обязаны:
//! - отдавать `ContactEvent` уже нормализованным (`body` = сторона, для которой
//!   событие, `other` = противоположная), по одному событию на каждую сторону пары;
//! - игнорировать операции над уже удалёнными handle'ами (no-op, не panic).

use bevy::prelude::*;

/// Handle физического тела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// Handle визуального объекта (drawable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableHandle(pub u64);

/// Параметры создания динамического тела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    /// Сфера — единственная форма, которая нужна ракетам
    pub radius: f32,
    /// false = тело репортит контакты, но не отталкивается (sensor)
    pub collision_response: bool,
}

/// Форма drawable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawableShape {
    Sphere { radius: f32 },
}

/// Контакт двух тел, нормализованный относительно `body`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub body: BodyHandle,
    pub other: BodyHandle,
    /// Точка контакта относительно позиции `body`
    pub local_point: Vec3,
}

impl ContactEvent {
    /// То же событие с точки зрения второй стороны
    ///
    /// `other_position - body_position` нужен, чтобы перевести точку в frame `other`.
    pub fn flipped(&self, body_to_other: Vec3) -> Self {
        Self {
            body: self.other,
            other: self.body,
            local_point: self.local_point - body_to_other,
        }
    }
}

/// Минимальный набор операций physics world, нужный rocket core
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, body: BodyHandle);

    fn position(&self, body: BodyHandle) -> Option<Vec3>;
    fn rotation(&self, body: BodyHandle) -> Option<Quat>;
    fn velocity(&self, body: BodyHandle) -> Option<Vec3>;

    fn set_position(&mut self, body: BodyHandle, position: Vec3);
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    /// Полная остановка: velocity = 0 и сброс всего, что ещё не применено
    /// (накопленная сила / impulse до следующего step)
    fn reset_motion(&mut self, body: BodyHandle);

    /// Сила на следующий step (заменяет предыдущую, не накапливается)
    fn apply_force(&mut self, body: BodyHandle, force: Vec3);
    /// Мгновенный импульс в center of mass (без torque)
    fn apply_impulse_at_center(&mut self, body: BodyHandle, impulse: Vec3);
}

/// Render/scene collaborator
pub trait SceneGraph {
    fn add_drawable(&mut self, shape: DrawableShape) -> DrawableHandle;
    fn remove_drawable(&mut self, drawable: DrawableHandle);
    fn set_transform(&mut self, drawable: DrawableHandle, position: Vec3, rotation: Quat);
}
