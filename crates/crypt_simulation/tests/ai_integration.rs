//! AI integration tests: полный FixedUpdate пайплайн с headless collaborators
//!
//! Проверяем:
//! - преследование игрока
//! - burst стрельбу босса через шину
//! - оглушение останавливает врага и проходит
//! - захват DemonFly и освобождение при смерти держащего
//! - одну цель держит не больше одного захвата, захваченного не отбрасывает

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use crypt_simulation::ai::{GrappleConfig, RangedConfig};
use crypt_simulation::combat::{
    ContactDamager, DamageIntent, ProjectileFired, Restrained, StunRequest, Stunned,
};
use crypt_simulation::events::{channels, typed_listener};
use crypt_simulation::headless::spawn_headless_enemy;
use crypt_simulation::*;

fn create_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));
    app
}

fn spawn_player(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Name::new("Player"),
            Player,
            Actor::new(PLAYER_FACTION),
            Health::new(1000),
            Transform::from_translation(position),
        ))
        .id()
}

fn spawn_enemy(app: &mut App, definition: &EnemyDefinition, position: Vec3) -> Entity {
    let config = app.world().resource::<SimulationConfig>().clone();
    let world = app.world_mut();
    let (entity, _) = spawn_headless_enemy(&mut world.commands(), definition, position, None, &config);
    world.flush();
    entity
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

fn tick(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        app.update();
    }
}

#[test]
fn test_chaser_closes_distance() {
    let mut app = create_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let enemy = spawn_enemy(&mut app, &EnemyDefinition::default(), Vec3::new(0.0, 0.0, 8.0));

    tick(&mut app, 120);

    let distance = position(&app, enemy).distance(position(&app, player));
    assert!(distance < 2.0, "chaser stayed at {distance:.2}m");
    assert_eq!(app.world().get::<EnemyBrain>(enemy).unwrap().target().map(|t| t.entity), Some(player));
}

#[test]
fn test_boss_fires_bursts_on_bus() {
    let mut app = create_app(42);
    let bus = app.world().resource::<EventBus>().clone();
    let shots = Arc::new(Mutex::new(Vec::new()));
    let sink = shots.clone();
    bus.register(
        channels::COMBAT,
        channels::PROJECTILE_FIRED,
        &typed_listener(move |_, fired: &ProjectileFired| sink.lock().unwrap().push(fired.clone())),
    );

    let player = spawn_player(&mut app, Vec3::ZERO);
    let boss = EnemyDefinition {
        name: "Crypt Lord".to_string(),
        kind: EnemyKind::Ranged(RangedConfig {
            desired_distance: 5.0,
            visibility_gate: false,
            ..Default::default()
        }),
        detection_radius: 20.0,
        ..Default::default()
    };
    let enemy = spawn_enemy(&mut app, &boss, Vec3::new(0.0, 0.0, 8.0));

    // Первый burst: 3 выстрела за ~1с, затем пауза 3с
    tick(&mut app, 90);
    {
        let shots = shots.lock().unwrap();
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|shot| shot.shooter == enemy));
        let aim = shots[0].direction;
        assert!(aim.dot((position(&app, player) - shots[0].origin).normalize()) > 0.9);
    }

    tick(&mut app, 120);
    assert_eq!(shots.lock().unwrap().len(), 3, "burst interval not respected");

    tick(&mut app, 120);
    assert!(shots.lock().unwrap().len() >= 4);
}

#[test]
fn test_stun_freezes_enemy_then_expires() {
    let mut app = create_app(42);
    spawn_player(&mut app, Vec3::ZERO);
    let enemy = spawn_enemy(&mut app, &EnemyDefinition::default(), Vec3::new(0.0, 0.0, 9.0));

    tick(&mut app, 20);
    app.world_mut().send_event(StunRequest { target: enemy, duration: Some(1.0) });
    tick(&mut app, 2);
    assert!(app.world().get::<Stunned>(enemy).is_some());

    let frozen = position(&app, enemy);
    tick(&mut app, 40);
    assert_eq!(position(&app, enemy), frozen);

    tick(&mut app, 40);
    assert!(app.world().get::<Stunned>(enemy).is_none());
    assert!(position(&app, enemy).z < frozen.z, "enemy did not resume the chase");
}

#[test]
fn test_demon_fly_grapple_released_on_death() {
    let mut app = create_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let enemy = spawn_enemy(&mut app, &demon_fly(), Vec3::new(0.0, 0.0, 7.0));

    let mut grappled = false;
    for _ in 0..300 {
        app.update();
        if app.world().get::<Restrained>(player).is_some() {
            grappled = true;
            break;
        }
    }
    assert!(grappled, "demon fly never grappled the player");
    assert_eq!(app.world().get::<Restrained>(player).map(|hold| hold.holder), Some(enemy));

    app.world_mut().send_event(DamageIntent { source: Some(player), target: enemy, amount: 1000 });
    tick(&mut app, 3);

    assert!(app.world().get::<Restrained>(player).is_none());
}

fn demon_fly() -> EnemyDefinition {
    EnemyDefinition {
        name: "Demon Fly".to_string(),
        kind: EnemyKind::DemonFly(GrappleConfig::default()),
        move_speed: 5.0,
        ..Default::default()
    }
}

#[test]
fn test_two_demon_flies_never_share_a_target() {
    let mut app = create_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    spawn_enemy(&mut app, &demon_fly(), Vec3::new(1.0, 0.0, 0.0));
    spawn_enemy(&mut app, &demon_fly(), Vec3::new(-1.0, 0.0, 0.0));

    let mut grappled = false;
    for _ in 0..400 {
        app.update();

        let world = app.world_mut();
        let holders: Vec<Entity> = world
            .query::<(Entity, &EnemyBrain)>()
            .iter(world)
            .filter(|(_, brain)| brain.grappled_target() == Some(player))
            .map(|(entity, _)| entity)
            .collect();
        assert!(holders.len() <= 1, "{} flies hold the player", holders.len());

        if let Some(hold) = world.get::<Restrained>(player) {
            grappled = true;
            assert_eq!(holders, vec![hold.holder]);
        }
    }
    assert!(grappled, "demon flies never grappled the player");
}

#[test]
fn test_restrained_player_is_not_knocked_back() {
    let mut app = create_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    spawn_enemy(&mut app, &demon_fly(), Vec3::new(1.0, 0.0, 0.0));
    let brute = EnemyDefinition {
        name: "Brute".to_string(),
        contact: Some(ContactDamager::default()),
        ..Default::default()
    };
    spawn_enemy(&mut app, &brute, Vec3::new(0.0, 0.0, -1.0));

    let mut frozen: Option<Vec3> = None;
    let mut was_restrained = false;
    for _ in 0..400 {
        app.update();
        let restrained = app.world().get::<Restrained>(player).is_some();
        let current = position(&app, player);
        match (restrained, frozen) {
            (true, None) => {
                was_restrained = true;
                frozen = Some(current);
            }
            (true, Some(held)) => assert_eq!(current, held, "restrained player moved"),
            (false, _) => frozen = None,
        }
    }
    assert!(was_restrained, "demon fly never grappled the player");
}
