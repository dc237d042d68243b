//! Firing Controller — trigger input + cooldown
//!
//! Trigger level-triggered: пока `held`, каждый step пытаемся выстрелить.
//! Cooldown не буферизует отклонённые попытки, поэтому удержание даёт ровный
//! темп стрельбы, а не catch-up очередь.

use std::time::Duration;

/// Состояние кнопки выстрела
///
/// Пока игра на паузе (`enabled == false`) press/release игнорируются,
/// но уже зажатый trigger не сбрасывается.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireTrigger {
    held: bool,
    enabled: bool,
}

impl Default for FireTrigger {
    fn default() -> Self {
        Self {
            held: false,
            enabled: true,
        }
    }
}

impl FireTrigger {
    pub fn press(&mut self) {
        if self.enabled {
            self.held = true;
        }
    }

    pub fn release(&mut self) {
        if self.enabled {
            self.held = false;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Rate limiter: интервал между принятыми выстрелами >= `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireCooldown {
    interval: Duration,
    last_spawn: Option<Duration>,
}

impl FireCooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_spawn: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_spawn(&self) -> Option<Duration> {
        self.last_spawn
    }

    /// Первый выстрел всегда разрешён
    pub fn ready(&self, now: Duration) -> bool {
        match self.last_spawn {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    pub fn commit(&mut self, now: Duration) {
        self.last_spawn = Some(now);
    }
}
