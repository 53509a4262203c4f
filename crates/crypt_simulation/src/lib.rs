//! Crypt's Call Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 (strategic layer): AI врагов, combat правила,
//! pub-sub шина, persistence объектов сцены.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (game state, AI, combat rules)
//! - Движок = tactical layer (physics, rendering, navmesh, анимации) —
//!   только через collaborator traits (`collaborators`)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod collaborators;
pub mod combat;
pub mod components;
pub mod config;
pub mod drops;
pub mod events;
pub mod headless;
pub mod logger;
pub mod persistence;

// Re-export базовых компонентов для удобства
pub use ai::{AIPlugin, AIState, EnemyBrain, EnemyKind};
pub use combat::{CombatPlugin, DamageDealt, DamageIntent, Dead, EntityDied, EnemyRemoved};
pub use components::*;
pub use config::{ConfigError, EnemyDefinition, EnemyRegistry, SimulationConfig};
pub use drops::DropsPlugin;
pub use events::EventBus;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use persistence::{ActiveScene, PersistencePlugin, SceneStateStore};

/// Порядок фаз тика (FixedUpdate, строго по цепочке)
///
/// Perception → Decision → Effects → Motion → Resolution → Death → Cleanup
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Таймеры оглушения, spatial index
    Perception,
    /// Тики FSM врагов
    Decision,
    /// AI эффекты, contact damage
    Effects,
    /// Навигация, knockback, анимации
    Motion,
    /// Урон, лечение, смерть
    Resolution,
    /// Дропы и destroyed записи
    Death,
    /// Освобождение захватов, уборка трупов
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Perception,
                SimulationSet::Decision,
                SimulationSet::Effects,
                SimulationSet::Motion,
                SimulationSet::Resolution,
                SimulationSet::Death,
                SimulationSet::Cleanup,
            )
                .chain(),
        );

        // Хост мог уже подставить свой spatial provider / store
        if !app.world().contains_resource::<collaborators::SpatialQueryProvider>() {
            app.insert_resource(collaborators::SpatialQueryProvider::new(
                headless::HeadlessSpatialIndex::new(),
            ));
        }
        if !app.world().contains_resource::<EventBus>() {
            app.insert_resource(EventBus::new());
        }

        app
            // Fixed timestep (60Hz по умолчанию)
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            // Детерминистичный RNG
            .insert_resource(DeterministicRng::new(config.seed))
            .insert_resource(ActiveScene::new(config.initial_scene.clone()))
            .insert_resource(config)
            // Подсистемы (ECS strategic layer)
            .add_plugins((CombatPlugin, AIPlugin, DropsPlugin, PersistencePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin::new(SimulationConfig {
        seed,
        ..Default::default()
    }));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
