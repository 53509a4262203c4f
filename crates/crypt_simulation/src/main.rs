//! Headless симуляция Crypt's Call
//!
//! Игрок стоит в центре склепа и раз в секунду бьёт ближайшего врага.
//! Все события шины печатаются в консоль.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use crypt_simulation::collaborators::CameraView;
use crypt_simulation::combat::{
    DamageIntent, EnemyRemoved, EntityDied, GrappleChanged, HealthChanged, ProjectileFired, StunApplied,
};
use crypt_simulation::drops::{DropTable, ItemDropped, ItemTag};
use crypt_simulation::events::{channels, listener, typed_listener, Subscriptions};
use crypt_simulation::headless::{spawn_headless_enemy, PerspectiveViewport};
use crypt_simulation::*;

const TICKS: u32 = 60 * 60;
const PLAYER_HIT: u32 = 25;

fn assets_dir() -> PathBuf {
    let local = PathBuf::from("assets");
    if local.is_dir() {
        return local;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn bus_printer(bus: &EventBus) -> Subscriptions {
    let mut subscriptions = Subscriptions::new(bus)
        .with(
            channels::HEALTH,
            channels::HEALTH_CHANGE,
            typed_listener(|_, changed: &HealthChanged| {
                println!("  [Health/Change] {:?}: {}/{}", changed.entity, changed.current, changed.max)
            }),
        )
        .with(
            channels::HEALTH,
            channels::HEALTH_DIED,
            typed_listener(|_, died: &EntityDied| println!("  [Health/Died] {:?}", died.entity)),
        )
        .with(
            channels::ENEMIES,
            channels::ENEMY_DIED,
            typed_listener(|_, removed: &EnemyRemoved| {
                println!("  [Enemies/Died] {} at {:.1?}", removed.kind, removed.position)
            }),
        )
        .with(
            channels::COMBAT,
            channels::PROJECTILE_FIRED,
            typed_listener(|_, fired: &ProjectileFired| println!("  [Combat/ProjectileFired] {:?}", fired.shooter)),
        )
        .with(
            channels::COMBAT,
            channels::STUN,
            typed_listener(|_, stun: &StunApplied| println!("  [Combat/Stun] {:?} active={}", stun.entity, stun.active)),
        )
        .with(
            channels::COMBAT,
            channels::GRAPPLE,
            typed_listener(|_, grapple: &GrappleChanged| {
                println!("  [Combat/Grapple] {:?} → {:?} active={}", grapple.holder, grapple.target, grapple.active)
            }),
        )
        .with(
            channels::SCENE_MANAGEMENT,
            &channels::scene_load_event("Town"),
            listener(|_, _| println!("  [SceneManagement/LoadTown]")),
        );

    for tag in [ItemTag::Key, ItemTag::Potion, ItemTag::Gold, ItemTag::Crystal] {
        subscriptions = subscriptions.with(
            channels::ITEM_DROP,
            tag.as_str(),
            typed_listener(|_, dropped: &ItemDropped| println!("  [ItemDrop] {}", dropped.item.name)),
        );
    }

    subscriptions.enable();
    subscriptions
}

fn main() {
    let assets = assets_dir();
    init_logger();

    let config = SimulationConfig::load_or_default(assets.join("simulation.ron"));
    println!("Starting Crypt's Call headless simulation (seed: {})", config.seed);

    let registry = match EnemyRegistry::load_dir(assets.join("enemies")) {
        Ok(registry) => registry,
        Err(e) => {
            log_error(&format!("{}", e));
            return;
        }
    };
    let drop_table = DropTable::load(assets.join("drop_table.ron")).unwrap_or_else(|e| {
        log_warning(&format!("{}. No random drops.", e));
        DropTable::default()
    });

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(config.clone()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / config.tick_hz)))
        .insert_resource(drop_table)
        .insert_resource(CameraView::new(PerspectiveViewport::looking_at(
            Vec3::new(0.0, 12.0, -18.0),
            Vec3::ZERO,
        )));

    let _printer = bus_printer(app.world().resource::<EventBus>());

    let player = app
        .world_mut()
        .spawn((Name::new("Player"), Player, Actor::new(PLAYER_FACTION), Health::new(500)))
        .id();

    let layout = [
        ("skeleton", Vec3::new(6.0, 0.0, 4.0)),
        ("dasher", Vec3::new(-7.0, 0.0, 3.0)),
        ("archer", Vec3::new(0.0, 0.0, 12.0)),
        ("demon_fly", Vec3::new(5.0, 0.0, -6.0)),
        ("boss", Vec3::new(0.0, 0.0, 18.0)),
    ];
    {
        let world = app.world_mut();
        let mut commands = world.commands();
        for (index, (key, position)) in layout.iter().enumerate() {
            let Ok(definition) = registry.get(key) else {
                log_warning(&format!("Demo: '{}' not found in registry", key));
                continue;
            };
            let scene_id = format!("crypt_enemy_{}", index);
            spawn_headless_enemy(&mut commands, definition, *position, Some(&scene_id), &config);
        }
        world.flush();
    }

    for tick in 0..TICKS {
        app.update();

        // "Оружие игрока": раз в секунду по ближайшему живому врагу
        if tick % 60 == 0 {
            let world = app.world_mut();
            let mut enemies = world.query_filtered::<(Entity, &Transform), (With<EnemyBrain>, Without<Dead>)>();
            let nearest = enemies
                .iter(world)
                .min_by(|(_, a), (_, b)| a.translation.length().total_cmp(&b.translation.length()))
                .map(|(entity, _)| entity);
            if let Some(target) = nearest {
                world.send_event(DamageIntent { source: Some(player), target, amount: PLAYER_HIT });
            }
        }

        if tick % 600 == 0 {
            let health = app.world().get::<Health>(player).map_or(0, |h| h.current);
            let enemies = app
                .world_mut()
                .query::<&EnemyBrain>()
                .iter(app.world())
                .count();
            println!("Tick {}: player HP {}, {} enemies", tick, health, enemies);
        }
    }

    println!("Simulation complete!");
}
