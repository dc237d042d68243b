//! Mouse / keyboard → RocketController
//!
//! - LMB держим → trigger зажат (auto-fire по cooldown)
//! - Esc → пауза (курсор отпущен, trigger выключен), клик → обратно в игру
//! - R → убрать все ракеты и вернуть игрока на старт текущего уровня

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use rocketjump_simulation::checkpoint::levels;
use rocketjump_simulation::physics::{body_handle, EcsScene, RapierWorld};
use rocketjump_simulation::{log_info, CheckpointMap, PhysicsWorld, Player, RocketController};

pub struct ControlsPlugin;

/// R нажата в Update, обрабатываем в ближайшем fixed step
#[derive(Resource, Default)]
struct ResetRequested(bool);

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResetRequested>()
            .add_systems(Update, (toggle_pause, fire_trigger, request_reset).chain())
            .add_systems(FixedPreUpdate, reset_level);
    }
}

fn set_cursor_grab(window: &mut Window, grabbed: bool) {
    if grabbed {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    } else {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

fn toggle_pause(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    controller: Option<ResMut<RocketController>>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    let mut window = match windows.single_mut() {
        Ok(window) => window,
        Err(_) => return,
    };
    let paused = window.cursor_options.grab_mode == CursorGrabMode::None;

    if paused && mouse_buttons.just_pressed(MouseButton::Left) {
        set_cursor_grab(&mut window, true);
        controller.trigger_mut().set_enabled(true);
        log_info("Resumed");
    } else if !paused && keys.just_pressed(KeyCode::Escape) {
        set_cursor_grab(&mut window, false);
        controller.trigger_mut().release();
        controller.trigger_mut().set_enabled(false);
        log_info("Paused");
    }
}

fn fire_trigger(mouse_buttons: Res<ButtonInput<MouseButton>>, controller: Option<ResMut<RocketController>>) {
    let Some(mut controller) = controller else {
        return;
    };

    // press() на выключенном trigger'е игнорируется (пауза)
    if mouse_buttons.pressed(MouseButton::Left) {
        if !controller.trigger().is_held() {
            controller.trigger_mut().press();
        }
    } else if controller.trigger().is_held() {
        controller.trigger_mut().release();
    }
}

fn request_reset(keys: Res<ButtonInput<KeyCode>>, mut reset: ResMut<ResetRequested>) {
    if keys.just_pressed(KeyCode::KeyR) {
        reset.0 = true;
    }
}

/// Fixed schedule: тела трогаем до Rapier step
fn reset_level(
    mut reset: ResMut<ResetRequested>,
    controller: Option<ResMut<RocketController>>,
    checkpoints: Res<CheckpointMap>,
    players: Query<Entity, With<Player>>,
    mut world: RapierWorld,
    mut scene: EcsScene,
) {
    if !std::mem::take(&mut reset.0) {
        return;
    }
    let Some(mut controller) = controller else {
        return;
    };
    world.sync_pending();

    let removed = controller.clear(&mut world, &mut scene);
    let start = levels::layout(checkpoints.current_level())
        .map(|layout| layout.start)
        .unwrap_or(levels::LEVEL1_START);
    for player in players.iter().map(body_handle) {
        world.reset_motion(player);
        world.set_position(player, start);
    }

    log_info(&format!("Level reset: {} rockets removed, player at {:?}", removed, start));
}
