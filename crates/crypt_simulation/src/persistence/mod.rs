//! Persistence объектов сцены между загрузками
//!
//! Объект со `SceneObject` при появлении ищет свою запись в store'е
//! активной сцены: transform восстанавливается, уничтоженный объект
//! сразу убирается. Смена сцены снимает snapshot всех живых объектов.

use bevy::prelude::*;
use rand::Rng;

pub mod store;

pub use store::{
    InMemoryBackend, PersistenceError, PersistenceResult, SavedObjectState, SceneRecords, SceneStateStore,
    StateBackend,
};

use crate::combat::{Dead, EntityDied};
use crate::events::{channels, EventBus};
use crate::SimulationSet;

/// Component: стабильный id объекта внутри сцены
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneObject {
    pub id: String,
}

impl SceneObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Новый id из RNG симуляции (детерминирован seed'ом)
    pub fn generate(rng: &mut impl Rng) -> Self {
        Self::new(format!("{:016x}", rng.gen::<u64>()))
    }
}

/// Resource: имя активной сцены
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ActiveScene {
    pub name: String,
}

impl ActiveScene {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ActiveScene {
    fn default() -> Self {
        Self::new("Town")
    }
}

/// Запрос смены сцены
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneChangeRequested {
    pub next: String,
}

/// Система: восстановление только что появившихся объектов сцены
pub fn restore_scene_objects(
    mut commands: Commands,
    store: Res<SceneStateStore>,
    active: Res<ActiveScene>,
    mut added: Query<(Entity, &SceneObject, &mut Transform), Added<SceneObject>>,
) {
    for (entity, object, mut transform) in added.iter_mut() {
        let Some(saved) = store.get_object(&active.name, &object.id) else {
            continue;
        };

        if saved.destroyed {
            crate::log(&format!("🧹 {} '{}' already destroyed, removing", active.name, object.id));
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation = saved.position;
        transform.rotation = saved.rotation;
    }
}

/// Система: смерть объекта сцены → destroyed запись
pub fn persist_destroyed_on_death(
    mut deaths: EventReader<EntityDied>,
    mut store: ResMut<SceneStateStore>,
    active: Res<ActiveScene>,
    objects: Query<(&SceneObject, &Transform)>,
) {
    for death in deaths.read() {
        let Ok((object, transform)) = objects.get(death.entity) else {
            continue;
        };
        store.save_single_object(
            &active.name,
            &object.id,
            SavedObjectState::from_transform(transform, true),
        );
        crate::log(&format!("💾 {} '{}' marked destroyed", active.name, object.id));
    }
}

/// Система: смена сцены
///
/// За тик выполняется только последний запрос: промежуточные сцены
/// не загружаются и не получают чужих объектов.
///
/// 1. Snapshot живых объектов (мёртвые → destroyed) поверх уже
///    сохранённых destroyed записей
/// 2. Объекты старой сцены убираются
/// 3. ActiveScene → next, SceneManagement/Load<next> в шину
pub fn change_scene(
    mut commands: Commands,
    mut requests: EventReader<SceneChangeRequested>,
    mut store: ResMut<SceneStateStore>,
    mut active: ResMut<ActiveScene>,
    bus: Res<EventBus>,
    objects: Query<(Entity, &SceneObject, &Transform, Has<Dead>)>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    if request.next == active.name {
        return;
    }

    let mut records: SceneRecords = store
        .get_scene_state(&active.name)
        .into_iter()
        .filter(|(_, state)| state.destroyed)
        .collect();

    for (entity, object, transform, dead) in objects.iter() {
        records.insert(object.id.clone(), SavedObjectState::from_transform(transform, dead));
        commands.entity(entity).despawn();
    }

    crate::log_info(&format!(
        "🚪 Scene {} → {} ({} records saved)",
        active.name,
        request.next,
        records.len()
    ));
    store.save_scene_state(&active.name, records);

    active.name = request.next.clone();
    bus.publish_value(
        channels::SCENE_MANAGEMENT,
        &channels::scene_load_event(&request.next),
        request.next.clone(),
    );
}

/// Persistence Plugin
///
/// - restore: до Perception (новые объекты сразу на своих местах)
/// - destroyed записи: Death
/// - смена сцены: последней, после Cleanup
pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneStateStore>()
            .init_resource::<ActiveScene>()
            .add_event::<SceneChangeRequested>()
            .add_systems(
                FixedUpdate,
                (
                    restore_scene_objects.before(SimulationSet::Perception),
                    persist_destroyed_on_death.in_set(SimulationSet::Death),
                    change_scene.after(SimulationSet::Cleanup),
                ),
            );
    }
}
