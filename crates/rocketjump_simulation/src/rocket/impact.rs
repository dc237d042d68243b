//! Impact Resolver — классификация контакта и расчёт knockback
//!
//! Falloff линейный: `strength = max(0, mult - distance × mult / falloff)`.
//! На дистанции `falloff` и дальше импульс нулевой, отрицательной силы
//! (притяжения) не бывает.

use bevy::prelude::*;

use super::ports::BodyHandle;
use super::registry::RocketId;

/// Дистанция, ниже которой направление взрыв→игрок не определено
pub const MIN_KNOCKBACK_DISTANCE: f32 = 1e-6;

/// Сила knockback на заданной дистанции
pub fn knockback_strength(distance: f32, strength_mult: f32, falloff_distance: f32) -> f32 {
    (strength_mult - distance * (strength_mult / falloff_distance)).max(0.0)
}

/// Рассчитанный knockback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub direction: Vec3,
    pub distance: f32,
    pub strength: f32,
    /// Взрыв в центре игрока: direction = +Y, strength = max
    pub too_close: bool,
}

impl Knockback {
    pub fn compute(player_position: Vec3, impact_point: Vec3, strength_mult: f32, falloff_distance: f32) -> Self {
        let to_player = player_position - impact_point;
        let distance = to_player.length();

        if !(distance > MIN_KNOCKBACK_DISTANCE) {
            return Self {
                direction: Vec3::Y,
                distance: 0.0,
                strength: strength_mult.max(0.0),
                too_close: true,
            };
        }

        Self {
            direction: to_player / distance,
            distance,
            strength: knockback_strength(distance, strength_mult, falloff_distance),
            too_close: false,
        }
    }

    pub fn impulse(&self) -> Vec3 {
        self.direction * self.strength
    }
}

/// Засчитанный взрыв ракеты
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub rocket: RocketId,
    /// World-space точка взрыва
    pub point: Vec3,
    pub knockback: Knockback,
}

impl Detonation {
    pub fn impulse(&self) -> Vec3 {
        self.knockback.impulse()
    }
}

/// Результат обработки одного контакта
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactOutcome {
    /// `body` не ракета (или уже удалена)
    NotARocket,
    /// Ракета уже взорвалась, ждёт removal
    AlreadyImpacted(RocketId),
    /// Контакт с телом игрока, который стреляет
    IgnoredFirer(RocketId),
    /// Контакт с другой живой ракетой
    IgnoredRocket { rocket: RocketId, other: RocketId },
    /// Impact засчитан, но rocket/player body уже нет в world: removal без knockback
    Orphaned(RocketId),
    Detonated(Detonation),
}

impl ImpactOutcome {
    pub fn detonation(&self) -> Option<&Detonation> {
        match self {
            ImpactOutcome::Detonated(detonation) => Some(detonation),
            _ => None,
        }
    }
}

/// Фильтр контакта до расчёта взрыва (без побочных эффектов)
pub(crate) fn classify(
    rocket: RocketId,
    impacted: bool,
    other: BodyHandle,
    player: BodyHandle,
    other_rocket: Option<RocketId>,
) -> Option<ImpactOutcome> {
    if impacted {
        return Some(ImpactOutcome::AlreadyImpacted(rocket));
    }
    if other == player {
        return Some(ImpactOutcome::IgnoredFirer(rocket));
    }
    if let Some(other) = other_rocket {
        return Some(ImpactOutcome::IgnoredRocket { rocket, other });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_law() {
        let cases = [(0.0, 110.0), (1.0, 88.0), (2.5, 55.0), (5.0, 0.0), (7.0, 0.0)];
        for (distance, expected) in cases {
            let strength = knockback_strength(distance, 110.0, 5.0);
            assert!(
                (strength - expected).abs() < 1e-4,
                "distance {}: got {}, expected {}",
                distance,
                strength,
                expected
            );
        }
    }

    #[test]
    fn test_never_pulls() {
        for i in 0..100 {
            let distance = i as f32 * 0.25;
            assert!(knockback_strength(distance, 110.0, 5.0) >= 0.0);
        }
    }

    #[test]
    fn test_knockback_points_from_impact_to_player() {
        let knockback = Knockback::compute(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.5), 110.0, 5.0);

        assert!(!knockback.too_close);
        assert!(knockback.direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!((knockback.strength - 55.0).abs() < 1e-4);
        assert!(knockback.impulse().abs_diff_eq(Vec3::new(0.0, 0.0, -55.0), 1e-3));
    }

    #[test]
    fn test_zero_distance_is_max_upward() {
        let p = Vec3::new(3.0, 4.0, 5.0);
        let knockback = Knockback::compute(p, p, 110.0, 5.0);

        assert!(knockback.too_close);
        assert_eq!(knockback.strength, 110.0);
        assert_eq!(knockback.direction, Vec3::Y);
        assert!(knockback.impulse().is_finite());
    }

    #[test]
    fn test_classify_order() {
        let rocket_id = {
            let mut registry = super::super::registry::RocketRegistry::new();
            registry.insert(
                BodyHandle(1),
                super::super::ports::DrawableHandle(1),
                std::time::Duration::ZERO,
            )
        };
        let player = BodyHandle(99);

        assert_eq!(
            classify(rocket_id, true, player, player, None),
            Some(ImpactOutcome::AlreadyImpacted(rocket_id))
        );
        assert_eq!(
            classify(rocket_id, false, player, player, None),
            Some(ImpactOutcome::IgnoredFirer(rocket_id))
        );
        assert_eq!(
            classify(rocket_id, false, BodyHandle(5), player, Some(rocket_id)),
            Some(ImpactOutcome::IgnoredRocket {
                rocket: rocket_id,
                other: rocket_id
            })
        );
        assert_eq!(classify(rocket_id, false, BodyHandle(5), player, None), None);
    }
}
