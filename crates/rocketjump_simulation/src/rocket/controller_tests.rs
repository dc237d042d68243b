//! Unit tests для RocketController (sandbox world как physics collaborator)

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;

    use crate::config::RocketConfig;
    use crate::rocket::*;
    use crate::sandbox::{SandboxBody, SandboxScene, SandboxWorld};

    const EXTENTS: Vec3 = Vec3::new(0.1, 1.0, 0.1);

    struct Rig {
        world: SandboxWorld,
        scene: SandboxScene,
        controller: RocketController,
        player: BodyHandle,
    }

    fn rig(config: RocketConfig) -> Rig {
        let mut world = SandboxWorld::new(Vec3::new(0.0, -20.0, 0.0));
        let mut body = SandboxBody::dynamic_box(Vec3::ZERO, EXTENTS, 50.0);
        body.gravity_scale = 0.0;
        let player = world.add_body(body);

        Rig {
            world,
            scene: SandboxScene::new(),
            controller: RocketController::new(config, player, EXTENTS),
            player,
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    impl Rig {
        fn step(&mut self, now: Duration, aim: Vec3) -> StepReport {
            self.controller.step(&mut self.world, &mut self.scene, now, aim)
        }

        /// Один выстрел в момент `now` (trigger отпускается сразу)
        fn fire(&mut self, now: Duration, aim: Vec3) -> RocketId {
            self.controller.trigger_mut().press();
            let report = self.step(now, aim);
            self.controller.trigger_mut().release();
            report.fire.spawned().expect("rocket should spawn")
        }

        fn body_of(&self, rocket: RocketId) -> BodyHandle {
            self.controller.rocket(rocket).unwrap().body
        }

        fn contact(&mut self, body: BodyHandle, other: BodyHandle, local_point: Vec3) -> ImpactOutcome {
            self.controller.handle_contact(
                &mut self.world,
                ContactEvent {
                    body,
                    other,
                    local_point,
                },
            )
        }
    }

    #[test]
    fn test_held_trigger_respects_cooldown() {
        let mut rig = rig(RocketConfig::default());
        rig.controller.trigger_mut().press();

        let mut spawn_times = Vec::new();
        for i in 1..=200u64 {
            let now = ms(i * 10);
            if rig.step(now, Vec3::NEG_Z).fire.spawned().is_some() {
                spawn_times.push(now);
            }
        }

        assert_eq!(spawn_times, vec![ms(10), ms(810), ms(1610)]);
        for pair in spawn_times.windows(2) {
            assert!(pair[1] - pair[0] >= ms(800));
        }
        assert_eq!(rig.controller.live_rockets(), 3);
    }

    #[test]
    fn test_new_player_body_uses_its_own_extents() {
        let mut rig = rig(RocketConfig::default());
        let big = Vec3::new(0.5, 1.0, 0.5);
        let mut body = SandboxBody::dynamic_box(Vec3::new(10.0, 0.0, 0.0), big, 50.0);
        body.gravity_scale = 0.0;
        let other = rig.world.add_body(body);

        rig.controller.set_player(other, big);
        let rocket = rig.fire(ms(0), Vec3::Z);

        assert_eq!(rig.controller.player(), other);
        assert_eq!(rig.controller.player_extents(), big);
        // 0.5 × 1.5 + 0.2 от центра нового тела
        let position = rig.world.position(rig.body_of(rocket)).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(10.0, 0.0, 0.95), 1e-5), "{:?}", position);
    }

    #[test]
    fn test_cooldown_rejection_is_silent() {
        let mut rig = rig(RocketConfig::default());
        rig.fire(ms(0), Vec3::NEG_Z);

        rig.controller.trigger_mut().press();
        let report = rig.step(ms(400), Vec3::NEG_Z);

        assert_eq!(report.fire, FireOutcome::CoolingDown);
        // Отклонённая попытка не сдвигает окно
        assert_eq!(rig.controller.cooldown().last_spawn(), Some(ms(0)));
        assert!(rig.step(ms(800), Vec3::NEG_Z).fire.spawned().is_some());
    }

    #[test]
    fn test_spawn_creates_body_and_drawable_outside_player() {
        let mut rig = rig(RocketConfig::default());
        let rocket = rig.fire(ms(0), Vec3::Z);
        let entry = rig.controller.rocket(rocket).unwrap().clone();

        let position = rig.world.position(entry.body).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.35), 1e-5));
        assert_eq!(rig.world.velocity(entry.body), Some(Vec3::new(0.0, 0.0, 28.0)));

        let drawable = rig.scene.drawable(entry.drawable).unwrap();
        assert_eq!(drawable.position, position);
        assert_eq!(drawable.shape, DrawableShape::Sphere { radius: 0.2 });
    }

    #[test]
    fn test_invalid_aim_rejected_without_consuming_cooldown() {
        let mut rig = rig(RocketConfig::default());
        rig.controller.trigger_mut().press();

        let report = rig.step(ms(0), Vec3::ZERO);
        assert_eq!(
            report.fire,
            FireOutcome::Rejected(RocketError::InvalidAimDirection([0.0, 0.0, 0.0]))
        );
        assert_eq!(rig.controller.live_rockets(), 0);
        assert!(rig.scene.is_empty());

        // Следующий step с нормальным aim стреляет сразу
        assert!(rig.step(ms(16), Vec3::NEG_Z).fire.spawned().is_some());
    }

    #[test]
    fn test_missing_player_rejects_fire() {
        let mut rig = rig(RocketConfig::default());
        rig.world.remove_body(rig.player);
        rig.controller.trigger_mut().press();

        let report = rig.step(ms(0), Vec3::NEG_Z);
        assert_eq!(report.fire, FireOutcome::Rejected(RocketError::PlayerMissing));
    }

    #[test]
    fn test_contact_with_firer_is_ignored() {
        let mut rig = rig(RocketConfig::default());
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let body = rig.body_of(rocket);
        let player = rig.player;

        assert_eq!(
            rig.contact(body, player, Vec3::ZERO),
            ImpactOutcome::IgnoredFirer(rocket)
        );
        let report = rig.step(ms(16), Vec3::NEG_Z);

        assert!(report.removed.is_empty());
        assert!(rig.controller.registry().contains(rocket));
        assert_eq!(rig.world.velocity(rig.player), Some(Vec3::ZERO));
    }

    #[test]
    fn test_rocket_rocket_contact_is_ignored() {
        let mut rig = rig(RocketConfig::default());
        let first = rig.fire(ms(0), Vec3::NEG_Z);
        let second = rig.fire(ms(800), Vec3::X);
        let (a, b) = (rig.body_of(first), rig.body_of(second));

        assert_eq!(
            rig.contact(a, b, Vec3::ZERO),
            ImpactOutcome::IgnoredRocket {
                rocket: first,
                other: second
            }
        );
        assert_eq!(
            rig.contact(b, a, Vec3::ZERO),
            ImpactOutcome::IgnoredRocket {
                rocket: second,
                other: first
            }
        );

        rig.step(ms(816), Vec3::NEG_Z);
        assert_eq!(rig.controller.live_rockets(), 2);
    }

    #[test]
    fn test_repeated_contacts_detonate_once() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -3.0), Vec3::new(5.0, 5.0, 0.5));
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let body = rig.body_of(rocket);
        let drawable = rig.controller.rocket(rocket).unwrap().drawable;

        let first = rig.contact(body, wall, Vec3::ZERO);
        let detonation = *first.detonation().expect("first contact detonates");
        for _ in 0..3 {
            assert_eq!(rig.contact(body, wall, Vec3::ZERO), ImpactOutcome::AlreadyImpacted(rocket));
        }

        let expected_velocity = detonation.impulse() / 50.0;
        assert!(rig.world.velocity(rig.player).unwrap().abs_diff_eq(expected_velocity, 1e-6));
        assert_eq!(rig.controller.pending_removals(), 1);

        let report = rig.step(ms(16), Vec3::NEG_Z);
        assert_eq!(report.removed, vec![rocket]);
        assert!(!rig.world.contains(body));
        assert!(!rig.scene.contains(drawable));

        // После removal тело уже не ракета
        assert_eq!(rig.contact(body, wall, Vec3::ZERO), ImpactOutcome::NotARocket);
        assert_eq!(rig.controller.rocket(rocket), Err(RocketError::UnknownRocket(rocket)));
    }

    #[test]
    fn test_simultaneous_impacts_all_removed_in_one_step() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -30.0), Vec3::new(50.0, 50.0, 0.5));

        let rockets: Vec<RocketId> = (0..4u64)
            .map(|i| rig.fire(ms(i * 800), Vec3::NEG_Z))
            .collect();
        for rocket in &rockets {
            let body = rig.body_of(*rocket);
            assert!(rig.contact(body, wall, Vec3::ZERO).detonation().is_some());
        }

        let report = rig.step(ms(3300), Vec3::NEG_Z);

        assert_eq!(report.removed, rockets);
        assert_eq!(rig.controller.live_rockets(), 0);
        assert_eq!(rig.controller.pending_removals(), 0);
        // Остались только игрок и стена, ни одного drawable
        assert_eq!(rig.world.len(), 2);
        assert!(rig.scene.is_empty());
    }

    #[test]
    fn test_contact_orientation_does_not_matter() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -3.0), Vec3::new(5.0, 5.0, 0.5));
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let body = rig.body_of(rocket);

        // Сторона стены: не ракета, ничего не происходит
        let wall_side = ContactEvent {
            body: wall,
            other: body,
            local_point: Vec3::new(0.0, 0.0, 0.5),
        };
        assert_eq!(
            rig.controller.handle_contact(&mut rig.world, wall_side),
            ImpactOutcome::NotARocket
        );
        assert_eq!(rig.controller.pending_removals(), 0);

        // Та же пара со стороны ракеты
        let rocket_position = rig.world.position(body).unwrap();
        let rocket_side = wall_side.flipped(rocket_position - Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(rocket_side.body, body);
        assert!(rig
            .controller
            .handle_contact(&mut rig.world, rocket_side)
            .detonation()
            .is_some());
    }

    #[test]
    fn test_knockback_uses_world_contact_point() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -3.0), Vec3::new(5.0, 5.0, 0.5));
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let body = rig.body_of(rocket);

        // Ракета в (0, 0, -0.35), точка контакта на 0.15 дальше по -Z → distance 0.5
        let outcome = rig.contact(body, wall, Vec3::new(0.0, 0.0, -0.15));
        let detonation = outcome.detonation().unwrap();

        assert!(detonation.point.abs_diff_eq(Vec3::new(0.0, 0.0, -0.5), 1e-5));
        assert!((detonation.knockback.distance - 0.5).abs() < 1e-5);
        assert!((detonation.knockback.strength - 99.0).abs() < 1e-3);
        assert!(detonation.knockback.direction.abs_diff_eq(Vec3::Z, 1e-5));

        let velocity = rig.world.velocity(rig.player).unwrap();
        assert!(velocity.abs_diff_eq(Vec3::new(0.0, 0.0, 99.0 / 50.0), 1e-4));
    }

    #[test]
    fn test_far_impact_applies_zero_impulse() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -30.0), Vec3::new(5.0, 5.0, 0.5));
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let body = rig.body_of(rocket);
        rig.world.set_position(body, Vec3::new(0.0, 0.0, -29.3));

        let outcome = rig.contact(body, wall, Vec3::new(0.0, 0.0, -0.2));
        assert_eq!(outcome.detonation().unwrap().knockback.strength, 0.0);
        assert_eq!(rig.world.velocity(rig.player), Some(Vec3::ZERO));
        // Но ракета всё равно удаляется
        assert_eq!(rig.step(ms(16), Vec3::NEG_Z).removed, vec![rocket]);
    }

    #[test]
    fn test_lift_and_drawable_sync() {
        let mut rig = rig(RocketConfig::default());
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);
        let entry = rig.controller.rocket(rocket).unwrap().clone();

        for i in 1..=30u64 {
            rig.world.step(1.0 / 60.0);
            rig.step(ms(i * 16), Vec3::NEG_Z);
        }

        // lift (0, 20, 0) при mass 1 гасит gravity -20
        let velocity = rig.world.velocity(entry.body).unwrap();
        assert!(velocity.y.abs() < 1e-4);

        let position = rig.world.position(entry.body).unwrap();
        assert_eq!(rig.scene.drawable(entry.drawable).unwrap().position, position);
    }

    #[test]
    fn test_lifetime_expiry_without_knockback() {
        let config = RocketConfig {
            max_lifetime_ms: Some(1000),
            ..RocketConfig::default()
        };
        let mut rig = rig(config);
        let rocket = rig.fire(ms(0), Vec3::NEG_Z);

        assert!(rig.step(ms(999), Vec3::NEG_Z).expired.is_empty());
        let report = rig.step(ms(1000), Vec3::NEG_Z);

        assert_eq!(report.expired, vec![rocket]);
        assert!(report.removed.is_empty());
        assert_eq!(rig.controller.live_rockets(), 0);
        assert_eq!(rig.world.velocity(rig.player), Some(Vec3::ZERO));
    }

    #[test]
    fn test_no_lifetime_by_default() {
        let mut rig = rig(RocketConfig::default());
        rig.fire(ms(0), Vec3::NEG_Z);

        assert!(rig.step(ms(600_000), Vec3::NEG_Z).expired.is_empty());
        assert_eq!(rig.controller.live_rockets(), 1);
    }

    #[test]
    fn test_clear_tears_down_everything() {
        let mut rig = rig(RocketConfig::default());
        let wall = rig.world.add_static_box(Vec3::new(0.0, 0.0, -3.0), Vec3::new(5.0, 5.0, 0.5));
        let first = rig.fire(ms(0), Vec3::NEG_Z);
        rig.fire(ms(800), Vec3::X);
        let body = rig.body_of(first);
        rig.contact(body, wall, Vec3::ZERO);

        assert_eq!(rig.controller.clear(&mut rig.world, &mut rig.scene), 2);
        assert_eq!(rig.controller.pending_removals(), 0);
        assert!(rig.scene.is_empty());
        assert_eq!(rig.world.len(), 2);

        // Пустая очередь → step ничего не удаляет
        assert!(rig.step(ms(1600), Vec3::NEG_Z).removed.is_empty());
    }

    #[test]
    fn test_controllers_are_isolated() {
        let mut a = rig(RocketConfig::default());
        let mut b = rig(RocketConfig::default());

        a.fire(ms(0), Vec3::NEG_Z);
        // Cooldown одного controller не влияет на другой
        b.fire(ms(10), Vec3::NEG_Z);

        assert_eq!(a.controller.live_rockets(), 1);
        assert_eq!(b.controller.live_rockets(), 1);
    }
}
