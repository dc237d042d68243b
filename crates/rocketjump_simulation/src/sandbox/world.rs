//! SandboxWorld — детерминированный reference physics world
//!
//! Не претендует на полноценный solver:
//! - формы: сфера и axis-aligned box (вращения нет, rotation всегда identity)
//! - интеграция semi-implicit Euler, сила живёт один step
//! - импульс мгновенно меняет velocity (`Δv = J / m`)
//! - resolution только dynamic ↔ static (push-out + гашение нормальной скорости),
//!   и только если у обоих включён `collision_response`
//! - контакты репортятся КАЖДЫЙ step, пока тела пересекаются, в обеих ориентациях

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::rocket::{BodyDesc, BodyHandle, ContactEvent, PhysicsWorld};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxBody {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec3,
    pub velocity: Vec3,
    pub force: Vec3,
    pub mass: f32,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub collision_response: bool,
}

impl SandboxBody {
    pub fn fixed_box(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: BodyKind::Static,
            shape: Shape::Cuboid { half_extents },
            position: center,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 0.0,
            gravity_scale: 0.0,
            linear_damping: 0.0,
            collision_response: true,
        }
    }

    pub fn dynamic_box(center: Vec3, half_extents: Vec3, mass: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: Shape::Cuboid { half_extents },
            position: center,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            collision_response: true,
        }
    }

    fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    fn inverse_mass(&self) -> f32 {
        if self.is_dynamic() && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }
}

/// Геометрия пересечения пары (a, b)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Overlap {
    /// World-space точка контакта
    point: Vec3,
    /// Нормаль от a к b
    normal: Vec3,
    depth: f32,
}

#[derive(Debug)]
pub struct SandboxWorld {
    bodies: BTreeMap<u64, SandboxBody>,
    next_id: u64,
    gravity: Vec3,
}

impl SandboxWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            gravity,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn add_body(&mut self, body: SandboxBody) -> BodyHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.bodies.insert(id, body);
        BodyHandle(id)
    }

    pub fn add_static_box(&mut self, center: Vec3, half_extents: Vec3) -> BodyHandle {
        self.add_body(SandboxBody::fixed_box(center, half_extents))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&SandboxBody> {
        self.bodies.get(&handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut SandboxBody> {
        self.bodies.get_mut(&handle.0)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Интеграция + контакты. Возвращает контакты этого step'а (обе ориентации).
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.is_dynamic()) {
            let acceleration = gravity * body.gravity_scale + body.force * body.inverse_mass();
            body.velocity += acceleration * dt;
            if body.linear_damping > 0.0 {
                body.velocity *= (1.0 - body.linear_damping).max(0.0).powf(dt);
            }
            body.position += body.velocity * dt;
            body.force = Vec3::ZERO;
        }

        let ids: Vec<u64> = self.bodies.keys().copied().collect();
        let mut contacts = Vec::new();

        for (i, &a_id) in ids.iter().enumerate() {
            for &b_id in &ids[i + 1..] {
                let (Some(a), Some(b)) = (self.bodies.get(&a_id), self.bodies.get(&b_id)) else {
                    continue;
                };
                if !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }
                let Some(overlap) = overlap(a, b) else {
                    continue;
                };

                let contact = ContactEvent {
                    body: BodyHandle(a_id),
                    other: BodyHandle(b_id),
                    local_point: overlap.point - a.position,
                };
                contacts.push(contact);
                contacts.push(contact.flipped(b.position - a.position));

                if a.collision_response && b.collision_response {
                    self.resolve(a_id, b_id, overlap);
                }
            }
        }

        contacts
    }

    fn resolve(&mut self, a_id: u64, b_id: u64, overlap: Overlap) {
        let (a_dynamic, b_dynamic) = match (self.bodies.get(&a_id), self.bodies.get(&b_id)) {
            (Some(a), Some(b)) => (a.is_dynamic(), b.is_dynamic()),
            _ => return,
        };

        // Только dynamic ↔ static; `push` = направление выталкивания dynamic тела
        let (id, push) = match (a_dynamic, b_dynamic) {
            (true, false) => (a_id, -overlap.normal),
            (false, true) => (b_id, overlap.normal),
            _ => return,
        };

        if let Some(body) = self.bodies.get_mut(&id) {
            body.position += push * overlap.depth;
            let into_surface = body.velocity.dot(push);
            if into_surface < 0.0 {
                body.velocity -= push * into_surface;
            }
        }
    }
}

impl PhysicsWorld for SandboxWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.add_body(SandboxBody {
            kind: BodyKind::Dynamic,
            shape: Shape::Sphere { radius: desc.radius },
            position: desc.position,
            velocity: desc.velocity,
            force: Vec3::ZERO,
            mass: desc.mass,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            collision_response: desc.collision_response,
        })
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body.0);
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.position)
    }

    fn rotation(&self, body: BodyHandle) -> Option<Quat> {
        self.body(body).map(|_| Quat::IDENTITY)
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.velocity)
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.body_mut(body) {
            if b.is_dynamic() {
                b.velocity = velocity;
            }
        }
    }

    fn reset_motion(&mut self, body: BodyHandle) {
        if let Some(b) = self.body_mut(body) {
            b.velocity = Vec3::ZERO;
            b.force = Vec3::ZERO;
        }
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.force = force;
        }
    }

    fn apply_impulse_at_center(&mut self, body: BodyHandle, impulse: Vec3) {
        if let Some(b) = self.body_mut(body) {
            b.velocity += impulse * b.inverse_mass();
        }
    }
}

fn overlap(a: &SandboxBody, b: &SandboxBody) -> Option<Overlap> {
    match (a.shape, b.shape) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(a.position, ra, b.position, rb)
        }
        (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
            sphere_box(a.position, radius, b.position, half_extents)
        }
        (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(b.position, radius, a.position, half_extents).map(|o| Overlap {
                normal: -o.normal,
                ..o
            })
        }
        (Shape::Cuboid { half_extents: ha }, Shape::Cuboid { half_extents: hb }) => {
            box_box(a.position, ha, b.position, hb)
        }
    }
}

fn sphere_sphere(pa: Vec3, ra: f32, pb: Vec3, rb: f32) -> Option<Overlap> {
    let delta = pb - pa;
    let distance = delta.length();
    if distance >= ra + rb {
        return None;
    }
    let normal = delta.try_normalize().unwrap_or(Vec3::Y);
    Some(Overlap {
        point: pa + normal * ra,
        normal,
        depth: ra + rb - distance,
    })
}

/// Нормаль от сферы к box'у
fn sphere_box(center: Vec3, radius: f32, box_center: Vec3, half: Vec3) -> Option<Overlap> {
    let min = box_center - half;
    let max = box_center + half;
    let closest = center.clamp(min, max);
    let delta = center - closest;
    let distance = delta.length();

    if closest != center {
        if distance >= radius {
            return None;
        }
        return Some(Overlap {
            point: closest,
            normal: -delta / distance,
            depth: radius - distance,
        });
    }

    // Центр сферы внутри box'а: выталкиваем через ближайшую грань
    let to_min = center - min;
    let to_max = max - center;
    let faces = [
        (to_min.x, Vec3::NEG_X),
        (to_max.x, Vec3::X),
        (to_min.y, Vec3::NEG_Y),
        (to_max.y, Vec3::Y),
        (to_min.z, Vec3::NEG_Z),
        (to_max.z, Vec3::Z),
    ];
    let (face_distance, outward) = faces
        .into_iter()
        .fold((f32::INFINITY, Vec3::Y), |best, face| if face.0 < best.0 { face } else { best });

    Some(Overlap {
        point: center,
        normal: -outward,
        depth: face_distance + radius,
    })
}

fn box_box(pa: Vec3, ha: Vec3, pb: Vec3, hb: Vec3) -> Option<Overlap> {
    let delta = pb - pa;
    let penetration = (ha + hb) - delta.abs();
    if penetration.min_element() <= 0.0 {
        return None;
    }

    let (depth, normal) = if penetration.x <= penetration.y && penetration.x <= penetration.z {
        (penetration.x, Vec3::X * sign(delta.x))
    } else if penetration.y <= penetration.z {
        (penetration.y, Vec3::Y * sign(delta.y))
    } else {
        (penetration.z, Vec3::Z * sign(delta.z))
    };

    // Центр области пересечения
    let low = (pa - ha).max(pb - hb);
    let high = (pa + ha).min(pb + hb);

    Some(Overlap {
        point: (low + high) * 0.5,
        normal,
        depth,
    })
}

fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}
