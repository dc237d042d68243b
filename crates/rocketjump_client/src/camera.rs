use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use rocketjump_simulation::PlayerAim;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (
            mouse_look,
            follow_player,
            write_player_aim,
        ).chain());
    }
}

/// Камера в голове игрока, aim = forward камеры
#[derive(Component)]
pub struct FirstPersonCamera {
    pub target: Entity,
    pub eye_height: f32,
    pub yaw: f32,   // Horizontal rotation (radians)
    pub pitch: f32, // Vertical rotation (radians)
    pub sensitivity: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            target: Entity::PLACEHOLDER,
            eye_height: 0.8,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.002,
        }
    }
}

impl FirstPersonCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Мышь крутит камеру только при захваченном курсоре
fn mouse_look(
    mut query: Query<&mut FirstPersonCamera>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut mouse_motion: EventReader<MouseMotion>,
) {
    let mut camera = match query.single_mut() {
        Ok(cam) => cam,
        Err(_) => return,
    };

    let grabbed = windows
        .single()
        .is_ok_and(|window| window.cursor_options.grab_mode != CursorGrabMode::None);
    if !grabbed {
        // Consume motion events even when paused
        mouse_motion.clear();
        return;
    }

    for motion in mouse_motion.read() {
        camera.yaw -= motion.delta.x * camera.sensitivity;
        camera.pitch -= motion.delta.y * camera.sensitivity;

        // Clamp pitch: строго вниз / вверх можно (выстрел под ноги)
        camera.pitch = camera.pitch.clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
    }
}

fn follow_player(
    mut cameras: Query<(&FirstPersonCamera, &mut Transform)>,
    targets: Query<&GlobalTransform, Without<FirstPersonCamera>>,
) {
    for (camera, mut transform) in cameras.iter_mut() {
        let Ok(target) = targets.get(camera.target) else {
            continue;
        };
        transform.translation = target.translation() + Vec3::Y * camera.eye_height;
        transform.rotation = camera.rotation();
    }
}

fn write_player_aim(
    cameras: Query<&FirstPersonCamera, Changed<FirstPersonCamera>>,
    mut aims: Query<&mut PlayerAim>,
) {
    for camera in cameras.iter() {
        if let Ok(mut aim) = aims.get_mut(camera.target) {
            aim.direction = camera.rotation() * Vec3::NEG_Z;
        }
    }
}
