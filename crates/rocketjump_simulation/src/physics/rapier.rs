//! Rapier адаптер: `PhysicsWorld` / `SceneGraph` поверх ECS
//!
//! - `BodyHandle` = `Entity::to_bits()` (collider и rigid body на одном entity)
//! - тела, созданные в текущем system run, ещё не видны query (commands не
//!   применены) → их позиция/скорость живут в `spawned` до следующего run
//! - Rapier sensor не даёт contact manifold: `normalize_collision` отдаёт
//!   `local_point` = 0, точку для ракеты достраивает `sensor_contact_point`
//!   (проекция центра ракеты на collider второй стороны)

use std::collections::HashMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::rocket::{BodyDesc, BodyHandle, ContactEvent, DrawableHandle, DrawableShape, PhysicsWorld, SceneGraph};

/// Drawable ракеты (mesh навешивает клиент)
#[derive(Component, Debug, Clone, Copy)]
pub struct RocketVisual {
    pub radius: f32,
}

/// Физическое тело ракеты (для debug / client queries)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct RocketBody;

pub fn body_handle(entity: Entity) -> BodyHandle {
    BodyHandle(entity.to_bits())
}

pub fn body_entity(handle: BodyHandle) -> Option<Entity> {
    Entity::try_from_bits(handle.0).ok()
}

fn drawable_entity(handle: DrawableHandle) -> Option<Entity> {
    Entity::try_from_bits(handle.0).ok()
}

/// Тело, созданное в этом system run
#[derive(Debug, Clone, Copy)]
struct PendingBody {
    position: Vec3,
    velocity: Vec3,
}

type BodyData = (
    &'static mut Transform,
    &'static mut Velocity,
    Option<&'static mut ExternalForce>,
    Option<&'static mut ExternalImpulse>,
);

#[derive(SystemParam)]
pub struct RapierWorld<'w, 's> {
    commands: Commands<'w, 's>,
    bodies: Query<'w, 's, BodyData, With<RigidBody>>,
    spawned: Local<'s, HashMap<BodyHandle, PendingBody>>,
}

impl RapierWorld<'_, '_> {
    /// Вызывать в начале system run: выкидывает тела, которые уже видны query
    pub fn sync_pending(&mut self) {
        let bodies = &self.bodies;
        self.spawned
            .retain(|handle, _| body_entity(*handle).is_some_and(|entity| !bodies.contains(entity)));
    }
}

impl PhysicsWorld for RapierWorld<'_, '_> {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let mut entity = self.commands.spawn((
            RocketBody,
            Transform::from_translation(desc.position),
            RigidBody::Dynamic,
            Collider::ball(desc.radius),
            ColliderMassProperties::Density(0.0),
            AdditionalMassProperties::Mass(desc.mass),
            Velocity::linear(desc.velocity),
            ExternalForce::default(),
            ExternalImpulse::default(),
            ActiveEvents::COLLISION_EVENTS,
        ));
        if !desc.collision_response {
            entity.insert(Sensor);
        }

        let handle = body_handle(entity.id());
        self.spawned.insert(
            handle,
            PendingBody {
                position: desc.position,
                velocity: desc.velocity,
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.spawned.remove(&body);
        let Some(entity) = body_entity(body) else {
            return;
        };
        if let Ok(mut commands) = self.commands.get_entity(entity) {
            commands.try_despawn();
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        let entity = body_entity(body)?;
        match self.bodies.get(entity) {
            Ok((transform, ..)) => Some(transform.translation),
            Err(_) => self.spawned.get(&body).map(|pending| pending.position),
        }
    }

    fn rotation(&self, body: BodyHandle) -> Option<Quat> {
        let entity = body_entity(body)?;
        match self.bodies.get(entity) {
            Ok((transform, ..)) => Some(transform.rotation),
            Err(_) => self.spawned.get(&body).map(|_| Quat::IDENTITY),
        }
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let entity = body_entity(body)?;
        match self.bodies.get(entity) {
            Ok((_, velocity, ..)) => Some(velocity.linvel),
            Err(_) => self.spawned.get(&body).map(|pending| pending.velocity),
        }
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        let Some(entity) = body_entity(body) else {
            return;
        };
        if let Ok((mut transform, ..)) = self.bodies.get_mut(entity) {
            transform.translation = position;
        } else if let Some(pending) = self.spawned.get_mut(&body) {
            pending.position = position;
            self.commands.entity(entity).insert(Transform::from_translation(position));
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        let Some(entity) = body_entity(body) else {
            return;
        };
        if let Ok((_, mut current, ..)) = self.bodies.get_mut(entity) {
            current.linvel = velocity;
            current.angvel = Vec3::ZERO;
        } else if let Some(pending) = self.spawned.get_mut(&body) {
            pending.velocity = velocity;
            self.commands.entity(entity).insert(Velocity::linear(velocity));
        }
    }

    fn reset_motion(&mut self, body: BodyHandle) {
        let Some(entity) = body_entity(body) else {
            return;
        };
        // Impulse от взрыва в этом же step ещё лежит в ExternalImpulse
        if let Ok((_, mut velocity, force, impulse)) = self.bodies.get_mut(entity) {
            *velocity = Velocity::zero();
            if let Some(mut force) = force {
                *force = ExternalForce::default();
            }
            if let Some(mut impulse) = impulse {
                *impulse = ExternalImpulse::default();
            }
        } else if let Some(pending) = self.spawned.get_mut(&body) {
            pending.velocity = Vec3::ZERO;
            self.commands
                .entity(entity)
                .insert((Velocity::zero(), ExternalForce::default(), ExternalImpulse::default()));
        }
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3) {
        let Some(entity) = body_entity(body) else {
            return;
        };
        // ExternalForce в Rapier постоянный: перезаписываем, не копим
        match self.bodies.get_mut(entity) {
            Ok((_, _, Some(mut external), _)) => external.force = force,
            Ok(_) => {
                self.commands.entity(entity).insert(ExternalForce { force, torque: Vec3::ZERO });
            }
            Err(_) => {
                if self.spawned.contains_key(&body) {
                    self.commands.entity(entity).insert(ExternalForce { force, torque: Vec3::ZERO });
                }
            }
        }
    }

    fn apply_impulse_at_center(&mut self, body: BodyHandle, impulse: Vec3) {
        let Some(entity) = body_entity(body) else {
            return;
        };
        // ExternalImpulse копится до следующего physics step, потом сбрасывается
        match self.bodies.get_mut(entity) {
            Ok((_, _, _, Some(mut external))) => external.impulse += impulse,
            Ok(_) => {
                self.commands.entity(entity).insert(ExternalImpulse {
                    impulse,
                    torque_impulse: Vec3::ZERO,
                });
            }
            Err(_) => {}
        }
    }
}

#[derive(SystemParam)]
pub struct EcsScene<'w, 's> {
    commands: Commands<'w, 's>,
    visuals: Query<'w, 's, &'static mut Transform, (With<RocketVisual>, Without<RigidBody>)>,
}

impl SceneGraph for EcsScene<'_, '_> {
    fn add_drawable(&mut self, shape: DrawableShape) -> DrawableHandle {
        let DrawableShape::Sphere { radius } = shape;
        let entity = self.commands.spawn((RocketVisual { radius }, Transform::default())).id();
        DrawableHandle(entity.to_bits())
    }

    fn remove_drawable(&mut self, drawable: DrawableHandle) {
        let Some(entity) = drawable_entity(drawable) else {
            return;
        };
        if let Ok(mut commands) = self.commands.get_entity(entity) {
            commands.try_despawn();
        }
    }

    fn set_transform(&mut self, drawable: DrawableHandle, position: Vec3, rotation: Quat) {
        let Some(entity) = drawable_entity(drawable) else {
            return;
        };
        if let Ok(mut transform) = self.visuals.get_mut(entity) {
            transform.translation = position;
            transform.rotation = rotation;
        } else if let Ok(mut commands) = self.commands.get_entity(entity) {
            commands.insert(Transform::from_translation(position).with_rotation(rotation));
        }
    }
}

/// `CollisionEvent::Started` → по событию на каждую сторону пары
///
/// `Stopped` игнорируется: impact засчитывается на начале контакта.
pub fn normalize_collision(event: &CollisionEvent) -> Option<[ContactEvent; 2]> {
    match event {
        CollisionEvent::Started(first, second, _) => {
            let (a, b) = (body_handle(*first), body_handle(*second));
            Some([
                ContactEvent {
                    body: a,
                    other: b,
                    local_point: Vec3::ZERO,
                },
                ContactEvent {
                    body: b,
                    other: a,
                    local_point: Vec3::ZERO,
                },
            ])
        }
        CollisionEvent::Stopped(..) => None,
    }
}

/// Точка контакта sensor-сферы с collider'ом, относительно центра сферы
///
/// Центр проецируется на поверхность collider'а; результат не дальше `radius`
/// (центр мог уже проскочить внутрь за один step).
pub fn sensor_contact_point(center: Vec3, radius: f32, collider: &Collider, transform: &GlobalTransform) -> Vec3 {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    let projection = collider.project_point(translation, rotation, center, false);
    (projection.point - center).clamp_length_max(radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    #[test]
    fn test_handle_roundtrips_entity() {
        let entity = Entity::from_raw(42);
        assert_eq!(body_entity(body_handle(entity)), Some(entity));
    }

    #[test]
    fn test_started_collision_yields_both_sides() {
        let (a, b) = (Entity::from_raw(1), Entity::from_raw(2));
        let [first, second] =
            normalize_collision(&CollisionEvent::Started(a, b, CollisionEventFlags::SENSOR)).unwrap();

        assert_eq!(first.body, body_handle(a));
        assert_eq!(first.other, body_handle(b));
        assert_eq!(second.body, body_handle(b));
        assert_eq!(second.other, body_handle(a));
    }

    #[test]
    fn test_sensor_contact_point_on_wall_face() {
        let wall = Collider::cuboid(5.0, 5.0, 0.5);
        let transform = GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 2.5));

        // Грань стены z = 2.0, ракета на 0.1 не долетела до неё центром
        let local = sensor_contact_point(Vec3::new(0.0, 0.0, 1.9), 0.2, &wall, &transform);
        assert!(local.abs_diff_eq(Vec3::new(0.0, 0.0, 0.1), 1e-4), "{:?}", local);
    }

    #[test]
    fn test_sensor_contact_point_clamped_to_radius() {
        let wall = Collider::cuboid(5.0, 5.0, 0.5);
        let transform = GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 2.5));

        // Центр уже за гранью (внутри стены) → ближайшая грань, но не дальше radius
        let local = sensor_contact_point(Vec3::new(4.0, 0.0, 2.3), 0.2, &wall, &transform);
        assert!((local.length() - 0.2).abs() < 1e-4);
        assert!(local.z < 0.0);
    }

    #[test]
    fn test_stopped_collision_ignored() {
        let (a, b) = (Entity::from_raw(1), Entity::from_raw(2));
        assert!(normalize_collision(&CollisionEvent::Stopped(a, b, CollisionEventFlags::empty())).is_none());
    }
}
