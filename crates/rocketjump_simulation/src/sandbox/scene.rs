//! SandboxScene — scene graph без рендера (drawable = запись в таблице)

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::rocket::{DrawableHandle, DrawableShape, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxDrawable {
    pub shape: DrawableShape,
    pub position: Vec3,
    pub rotation: Quat,
}

#[derive(Debug, Default)]
pub struct SandboxScene {
    drawables: BTreeMap<u64, SandboxDrawable>,
    next_id: u64,
}

impl SandboxScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drawable(&self, handle: DrawableHandle) -> Option<&SandboxDrawable> {
        self.drawables.get(&handle.0)
    }

    pub fn contains(&self, handle: DrawableHandle) -> bool {
        self.drawables.contains_key(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

impl SceneGraph for SandboxScene {
    fn add_drawable(&mut self, shape: DrawableShape) -> DrawableHandle {
        self.next_id += 1;
        self.drawables.insert(
            self.next_id,
            SandboxDrawable {
                shape,
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
        );
        DrawableHandle(self.next_id)
    }

    fn remove_drawable(&mut self, drawable: DrawableHandle) {
        self.drawables.remove(&drawable.0);
    }

    fn set_transform(&mut self, drawable: DrawableHandle, position: Vec3, rotation: Quat) {
        if let Some(entry) = self.drawables.get_mut(&drawable.0) {
            entry.position = position;
            entry.rotation = rotation;
        }
    }
}
