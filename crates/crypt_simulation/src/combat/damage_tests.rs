//! Unit тесты combat систем (World + run_system_once)

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;

    use crate::ai::systems::sync_spatial_index;
    use crate::ai::{EnemyBrain, EnemyKind};
    use crate::collaborators::{Animator, AnimatorHandle, NavAgent, Navigator, SpatialQueryProvider};
    use crate::combat::contact::{apply_knockback, contact_damage};
    use crate::combat::damage::{apply_damage, apply_healing};
    use crate::combat::grapple::release_orphaned_holds;
    use crate::combat::stun::{apply_stun_requests, tick_stuns};
    use crate::combat::*;
    use crate::components::{Actor, Health, ENEMY_FACTION, PLAYER_FACTION};
    use crate::config::SimulationConfig;
    use crate::events::{channels, typed_listener, EventBus};
    use crate::headless::{HeadlessSpatialIndex, KinematicNavigator, RecordingAnimator};

    fn combat_world() -> World {
        let mut world = World::new();
        world.init_resource::<Events<DamageIntent>>();
        world.init_resource::<Events<HealIntent>>();
        world.init_resource::<Events<DamageDealt>>();
        world.init_resource::<Events<HealthChanged>>();
        world.init_resource::<Events<EntityDied>>();
        world.init_resource::<Events<StunRequest>>();
        world.insert_resource(EventBus::new());
        world.insert_resource(SimulationConfig::default());
        world.insert_resource(SpatialQueryProvider::new(HeadlessSpatialIndex::new()));
        set_delta(&mut world, 1.0 / 60.0);
        world
    }

    fn set_delta(world: &mut World, dt: f32) {
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(dt));
        world.insert_resource(time);
    }

    fn run<M>(world: &mut World, system: impl IntoSystem<(), (), M>) {
        world.run_system_once(system).unwrap();
        world.flush();
    }

    fn events<E: Event + Clone>(world: &World) -> Vec<E> {
        world.resource::<Events<E>>().iter_current_update_events().cloned().collect()
    }

    fn spawn_player(world: &mut World, position: Vec3) -> Entity {
        world
            .spawn((Actor::new(PLAYER_FACTION), Transform::from_translation(position)))
            .id()
    }

    #[test]
    fn test_damage_publishes_health_change() {
        let mut world = combat_world();
        let player = spawn_player(&mut world, Vec3::ZERO);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        world.resource::<EventBus>().register(
            channels::HEALTH,
            channels::HEALTH_CHANGE,
            &typed_listener(move |_, changed: &HealthChanged| sink.lock().unwrap().push(changed.current)),
        );

        world.send_event(DamageIntent { source: None, target: player, amount: 30 });
        run(&mut world, apply_damage);

        assert_eq!(world.get::<Health>(player).unwrap().current, 70);
        assert_eq!(*seen.lock().unwrap(), vec![70]);

        let dealt = events::<DamageDealt>(&world);
        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].damage, 30);
        assert!(!dealt[0].target_died);
    }

    #[test]
    fn test_zero_damage_is_ignored() {
        let mut world = combat_world();
        let player = spawn_player(&mut world, Vec3::ZERO);

        world.send_event(DamageIntent { source: None, target: player, amount: 0 });
        run(&mut world, apply_damage);

        assert_eq!(world.get::<Health>(player).unwrap().current, 100);
        assert!(events::<HealthChanged>(&world).is_empty());
    }

    #[test]
    fn test_death_reported_exactly_once() {
        let mut world = combat_world();
        let player = spawn_player(&mut world, Vec3::ZERO);
        let killer = world.spawn_empty().id();

        let died_count = Arc::new(Mutex::new(0));
        let counter = died_count.clone();
        world.resource::<EventBus>().register(
            channels::HEALTH,
            channels::HEALTH_DIED,
            &typed_listener(move |_, _: &EntityDied| *counter.lock().unwrap() += 1),
        );

        for _ in 0..3 {
            world.send_event(DamageIntent { source: Some(killer), target: player, amount: 60 });
        }
        run(&mut world, apply_damage);

        assert_eq!(world.get::<Health>(player).unwrap().current, 0);
        assert_eq!(*died_count.lock().unwrap(), 1);
        let died = events::<EntityDied>(&world);
        assert_eq!(died, vec![EntityDied { entity: player, killer: Some(killer) }]);

        // Третий удар по мёртвому не дошёл
        assert_eq!(events::<DamageDealt>(&world).len(), 2);
    }

    #[test]
    fn test_healing_clamps_and_skips_dead() {
        let mut world = combat_world();
        let wounded = spawn_player(&mut world, Vec3::ZERO);
        let corpse = spawn_player(&mut world, Vec3::X);
        world.get_mut::<Health>(wounded).unwrap().take_damage(50);
        world.get_mut::<Health>(corpse).unwrap().take_damage(100);

        world.send_event(HealIntent { target: wounded, amount: 80 });
        world.send_event(HealIntent { target: corpse, amount: 80 });
        run(&mut world, apply_healing);

        assert_eq!(world.get::<Health>(wounded).unwrap().current, 100);
        assert_eq!(world.get::<Health>(corpse).unwrap().current, 0);
        assert_eq!(events::<HealthChanged>(&world).len(), 1);
    }

    #[test]
    fn test_stun_lifecycle() {
        let mut world = combat_world();
        let animator = RecordingAnimator::default();
        let enemy = world
            .spawn((
                Actor::new(ENEMY_FACTION),
                NavAgent::new(KinematicNavigator::new(3.5)),
                AnimatorHandle::new(animator.clone()),
            ))
            .id();

        world.send_event(StunRequest { target: enemy, duration: None });
        run(&mut world, apply_stun_requests);

        assert_eq!(world.get::<Stunned>(enemy), Some(&Stunned { remaining: 3.0 }));
        assert!(!world.get::<NavAgent>(enemy).unwrap().0.is_enabled());
        assert!(animator.flag("isStunned"));

        // Повторный stun не перезапускает таймер
        set_delta(&mut world, 1.0);
        run(&mut world, tick_stuns);
        world.send_event(StunRequest { target: enemy, duration: Some(10.0) });
        run(&mut world, apply_stun_requests);
        assert_eq!(world.get::<Stunned>(enemy), Some(&Stunned { remaining: 2.0 }));

        set_delta(&mut world, 2.0);
        run(&mut world, tick_stuns);

        assert!(world.get::<Stunned>(enemy).is_none());
        assert!(world.get::<NavAgent>(enemy).unwrap().0.is_enabled());
        assert!(!animator.flag("isStunned"));
    }

    #[test]
    fn test_dead_target_is_not_stunned() {
        let mut world = combat_world();
        let enemy = world.spawn((Actor::new(ENEMY_FACTION), Dead)).id();

        world.send_event(StunRequest { target: enemy, duration: None });
        run(&mut world, apply_stun_requests);

        assert!(world.get::<Stunned>(enemy).is_none());
    }

    #[test]
    fn test_orphaned_hold_released() {
        let mut world = combat_world();
        let holder = world.spawn(EnemyBrain::new(EnemyKind::Chaser)).id();
        let mut animator = RecordingAnimator::default();
        animator.set_bool("isStunned", true);
        let player = world
            .spawn((
                Actor::new(PLAYER_FACTION),
                Restrained { holder },
                AnimatorHandle::new(animator.clone()),
            ))
            .id();

        // Держащий жив, но не в Grappling на эту цель
        run(&mut world, release_orphaned_holds);

        assert!(world.get::<Restrained>(player).is_none());
        assert!(!animator.flag("isStunned"));
    }

    #[test]
    fn test_hold_of_despawned_holder_released() {
        let mut world = combat_world();
        let holder = world.spawn_empty().id();
        world.despawn(holder);
        let player = world
            .spawn((Actor::new(PLAYER_FACTION), Restrained { holder }))
            .id();

        run(&mut world, release_orphaned_holds);

        assert!(world.get::<Restrained>(player).is_none());
    }

    #[test]
    fn test_contact_damage_respects_interval() {
        let mut world = combat_world();
        let enemy = world
            .spawn((
                Actor::new(ENEMY_FACTION),
                Transform::default(),
                ContactDamager::default(),
            ))
            .id();
        let player = world
            .spawn((
                Actor::new(PLAYER_FACTION),
                Transform::from_xyz(0.0, 0.0, 1.0),
                NavAgent::new(KinematicNavigator::new(5.0)),
            ))
            .id();

        run(&mut world, sync_spatial_index);
        run(&mut world, contact_damage);

        let intents = events::<DamageIntent>(&world);
        assert_eq!(intents, vec![DamageIntent { source: Some(enemy), target: player, amount: 10 }]);
        let knockback = world.get::<Knockback>(player).copied().unwrap();
        assert_eq!(knockback.direction, Vec3::Z);
        assert!(world.get::<NavAgent>(player).unwrap().0.is_stopped());

        // Пока не прошёл interval — без урона
        set_delta(&mut world, 1.0);
        run(&mut world, contact_damage);
        assert_eq!(events::<DamageIntent>(&world).len(), 1);

        set_delta(&mut world, 1.0);
        run(&mut world, contact_damage);
        assert_eq!(events::<DamageIntent>(&world).len(), 2);
    }

    #[test]
    fn test_contact_on_restrained_target_hurts_without_knockback() {
        let mut world = combat_world();
        let holder = world.spawn_empty().id();
        let enemy = world
            .spawn((
                Actor::new(ENEMY_FACTION),
                Transform::default(),
                ContactDamager::default(),
            ))
            .id();
        let player = world
            .spawn((
                Actor::new(PLAYER_FACTION),
                Transform::from_xyz(0.0, 0.0, 1.0),
                Restrained { holder },
                NavAgent::new(KinematicNavigator::new(5.0)),
            ))
            .id();

        run(&mut world, sync_spatial_index);
        run(&mut world, contact_damage);

        assert_eq!(
            events::<DamageIntent>(&world),
            vec![DamageIntent { source: Some(enemy), target: player, amount: 10 }]
        );
        assert!(world.get::<Knockback>(player).is_none());
        assert_eq!(world.get::<Transform>(player).unwrap().translation, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_knockback_paused_while_restrained() {
        let mut world = combat_world();
        let holder = world.spawn_empty().id();
        let player = world
            .spawn((
                Transform::default(),
                Knockback { direction: Vec3::X, force: 7.0, remaining: 0.5 },
                Restrained { holder },
            ))
            .id();

        set_delta(&mut world, 0.25);
        run(&mut world, apply_knockback);

        assert_eq!(world.get::<Transform>(player).unwrap().translation, Vec3::ZERO);
        assert_eq!(world.get::<Knockback>(player).map(|k| k.remaining), Some(0.5));
    }

    #[test]
    fn test_stunned_damager_is_silent() {
        let mut world = combat_world();
        world.spawn((
            Actor::new(ENEMY_FACTION),
            Transform::default(),
            ContactDamager::default(),
            Stunned { remaining: 1.0 },
        ));
        spawn_player(&mut world, Vec3::new(0.5, 0.0, 0.0));

        run(&mut world, sync_spatial_index);
        run(&mut world, contact_damage);

        assert!(events::<DamageIntent>(&world).is_empty());
    }

    #[test]
    fn test_knockback_pushes_then_resumes_navigation() {
        let mut world = combat_world();
        let mut navigator = KinematicNavigator::new(5.0);
        navigator.stop();
        let player = world
            .spawn((
                Transform::default(),
                Knockback { direction: Vec3::X, force: 7.0, remaining: 0.5 },
                NavAgent::new(navigator),
            ))
            .id();

        set_delta(&mut world, 0.25);
        run(&mut world, apply_knockback);
        assert!((world.get::<Transform>(player).unwrap().translation.x - 1.75).abs() < 1e-4);
        assert!(world.get::<Knockback>(player).is_some());

        // Последний шаг обрезается по оставшемуся времени
        set_delta(&mut world, 1.0);
        run(&mut world, apply_knockback);
        assert!((world.get::<Transform>(player).unwrap().translation.x - 3.5).abs() < 1e-4);
        assert!(world.get::<Knockback>(player).is_none());
        assert!(!world.get::<NavAgent>(player).unwrap().0.is_stopped());
    }
}
