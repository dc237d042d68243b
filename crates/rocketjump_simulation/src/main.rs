//! Headless симуляция rocket jump
//!
//! Грузит level 1 в sandbox world, ставит игрока на старт и стреляет под ноги
//! с зажатым trigger'ом. Опционально: путь к TOML конфигу первым аргументом.

use std::process::ExitCode;

use bevy::math::Vec3;
use rocketjump_simulation::checkpoint::levels;
use rocketjump_simulation::{init_logger, log_error, set_log_level, GameConfig, SandboxSession};

fn main() -> ExitCode {
    init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Failed to load config {}: {}", path, err));
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    if let Some(level) = config.log_level() {
        set_log_level(level);
    }

    let ticks = (config.world.timestep_hz * 5.0).round() as usize;
    println!("Starting rocketjump headless simulation ({} ticks)", ticks);

    let mut session = SandboxSession::new(&config);
    let level = levels::level1();
    session.load_level(&level);
    session.place_player(level.start);

    // Под ноги и чуть вперёд
    session.set_aim(Vec3::new(0.0, -1.0, -0.3));
    session.press_trigger();

    let mut fired = 0;
    let mut detonations = 0;
    let mut respawns = 0;
    let mut max_height = level.start.y;

    for tick in 0..ticks {
        let report = session.tick();

        fired += usize::from(report.step.fire.spawned().is_some());
        detonations += report.detonations.len();
        respawns += report.respawns.len();

        if let Some(position) = session.player_position() {
            max_height = max_height.max(position.y);
        }

        if tick % 60 == 0 {
            println!(
                "Tick {}: player {:?}, live rockets {}",
                tick,
                session.player_position(),
                session.rockets().live_rockets()
            );
        }
    }

    println!(
        "Simulation complete! fired={} detonations={} respawns={} max_height={:.2}",
        fired, detonations, respawns, max_height
    );
    ExitCode::SUCCESS
}
