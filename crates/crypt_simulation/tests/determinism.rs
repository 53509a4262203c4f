//! Детерминизм симуляции
//!
//! Одинаковый seed → идентичные snapshot'ы (позиции, здоровье, состояния AI).
//! Patrol точки и drop rolls идут через DeterministicRng.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use crypt_simulation::ai::{DashConfig, PatrolConfig, PatrolMode, ShockwaveConfig};
use crypt_simulation::headless::spawn_headless_enemy;
use crypt_simulation::*;

fn squad() -> Vec<(EnemyDefinition, Vec3)> {
    vec![
        (
            EnemyDefinition {
                patrol: PatrolConfig { area_radius: 15.0, min_wait: 0.5, max_wait: 1.5, ..Default::default() },
                ..Default::default()
            },
            Vec3::new(20.0, 0.0, 20.0),
        ),
        (
            EnemyDefinition {
                patrol: PatrolConfig { mode: PatrolMode::PointSet, min_wait: 0.2, max_wait: 0.8, ..Default::default() },
                ..Default::default()
            },
            Vec3::new(-20.0, 0.0, 20.0),
        ),
        (
            EnemyDefinition {
                kind: EnemyKind::Dasher(DashConfig::default()),
                ..Default::default()
            },
            Vec3::new(0.0, 0.0, 9.0),
        ),
        (
            EnemyDefinition {
                kind: EnemyKind::Shockwave(ShockwaveConfig::default()),
                ..Default::default()
            },
            Vec3::new(-6.0, 0.0, -6.0),
        ),
        (
            EnemyDefinition {
                kind: EnemyKind::boss(),
                detection_radius: 25.0,
                ..Default::default()
            },
            Vec3::new(0.0, 0.0, -15.0),
        ),
    ]
}

fn run_and_snapshot(seed: u64, ticks: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    app.world_mut().spawn((
        Player,
        Actor::new(PLAYER_FACTION),
        Health::new(10_000),
        Transform::default(),
    ));

    let config = app.world().resource::<SimulationConfig>().clone();
    {
        let world = app.world_mut();
        let mut commands = world.commands();
        for (definition, position) in squad() {
            spawn_headless_enemy(&mut commands, &definition, position, None, &config);
        }
        world.flush();
    }

    for _ in 0..ticks {
        app.update();
    }

    let world = app.world_mut();
    (
        world_snapshot::<Transform>(world),
        world_snapshot::<Health>(world),
        world_snapshot::<EnemyBrain>(world),
    )
}

#[test]
fn test_same_seed_identical_snapshots() {
    const SEED: u64 = 42;
    const TICKS: usize = 600;

    let first = run_and_snapshot(SEED, TICKS);
    let second = run_and_snapshot(SEED, TICKS);

    assert_eq!(first.0, second.0, "Transforms разошлись при seed={}", SEED);
    assert_eq!(first.1, second.1, "Health разошёлся при seed={}", SEED);
    assert_eq!(first.2, second.2, "AI состояния разошлись при seed={}", SEED);
}

#[test]
fn test_different_seed_changes_patrol() {
    let first = run_and_snapshot(1, 300);
    let second = run_and_snapshot(2, 300);

    // Патрульные точки зависят от seed
    assert_ne!(first.0, second.0);
}
