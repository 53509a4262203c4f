//! Scene state store: сцена → (object id → SavedObjectState)
//!
//! In-memory кэш на время процесса. Durable хранение — забота хоста:
//! `export_ron` / `import_ron` на границе.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Сохранённое состояние объекта сцены
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedObjectState {
    pub position: Vec3,
    pub rotation: Quat,
    pub destroyed: bool,
}

impl SavedObjectState {
    pub fn from_transform(transform: &Transform, destroyed: bool) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
            destroyed,
        }
    }
}

/// Записи одной сцены (BTreeMap — стабильный порядок при экспорте)
pub type SceneRecords = BTreeMap<String, SavedObjectState>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize scene states: {0}")]
    Serialize(String),

    #[error("Failed to deserialize scene states: {0}")]
    Deserialize(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key-value хранилище за store'ом (подменяется хостом)
pub trait StateBackend: Send + Sync {
    fn scene(&self, scene: &str) -> Option<&SceneRecords>;
    /// Записи сцены, создаются пустыми при первом обращении
    fn scene_mut(&mut self, scene: &str) -> &mut SceneRecords;
    fn replace_scene(&mut self, scene: &str, records: SceneRecords);
    fn scenes(&self) -> Vec<String>;
    fn clear(&mut self);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    scenes: BTreeMap<String, SceneRecords>,
}

impl StateBackend for InMemoryBackend {
    fn scene(&self, scene: &str) -> Option<&SceneRecords> {
        self.scenes.get(scene)
    }

    fn scene_mut(&mut self, scene: &str) -> &mut SceneRecords {
        self.scenes.entry(scene.to_string()).or_default()
    }

    fn replace_scene(&mut self, scene: &str, records: SceneRecords) {
        self.scenes.insert(scene.to_string(), records);
    }

    fn scenes(&self) -> Vec<String> {
        self.scenes.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.scenes.clear();
    }
}

/// Resource: хранилище состояний сцен
#[derive(Resource)]
pub struct SceneStateStore {
    backend: Box<dyn StateBackend>,
}

impl Default for SceneStateStore {
    fn default() -> Self {
        Self::with_backend(InMemoryBackend::default())
    }
}

impl SceneStateStore {
    pub fn with_backend(backend: impl StateBackend + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    /// Полностью заменяет записи сцены
    pub fn save_scene_state(&mut self, scene: &str, records: SceneRecords) {
        self.backend.replace_scene(scene, records);
    }

    /// Upsert одной записи
    pub fn save_single_object(&mut self, scene: &str, object_id: &str, state: SavedObjectState) {
        self.backend.scene_mut(scene).insert(object_id.to_string(), state);
    }

    /// Записи сцены или пустая map для неизвестной сцены
    pub fn get_scene_state(&self, scene: &str) -> SceneRecords {
        self.backend.scene(scene).cloned().unwrap_or_default()
    }

    pub fn get_object(&self, scene: &str, object_id: &str) -> Option<SavedObjectState> {
        self.backend.scene(scene).and_then(|records| records.get(object_id)).copied()
    }

    pub fn scenes(&self) -> Vec<String> {
        self.backend.scenes()
    }

    pub fn export_ron(&self) -> PersistenceResult<String> {
        let all: BTreeMap<String, SceneRecords> = self
            .backend
            .scenes()
            .into_iter()
            .map(|scene| {
                let records = self.get_scene_state(&scene);
                (scene, records)
            })
            .collect();

        ron::ser::to_string_pretty(&all, ron::ser::PrettyConfig::default())
            .map_err(|e| PersistenceError::Serialize(e.to_string()))
    }

    /// Заменяет всё содержимое store'а. При ошибке store не меняется.
    pub fn import_ron(&mut self, text: &str) -> PersistenceResult<()> {
        let all: BTreeMap<String, SceneRecords> =
            ron::from_str(text).map_err(|e| PersistenceError::Deserialize(e.to_string()))?;

        self.backend.clear();
        for (scene, records) in all {
            self.backend.replace_scene(&scene, records);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destroyed_at(x: f32) -> SavedObjectState {
        SavedObjectState {
            position: Vec3::new(x, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            destroyed: true,
        }
    }

    #[test]
    fn test_single_object_upsert() {
        let mut store = SceneStateStore::default();
        store.save_single_object("Crypt_01", "e1", destroyed_at(1.0));

        let records = store.get_scene_state("Crypt_01");
        assert!(records["e1"].destroyed);

        store.save_single_object("Crypt_01", "e1", SavedObjectState { destroyed: false, ..destroyed_at(2.0) });
        assert_eq!(store.get_object("Crypt_01", "e1").map(|s| s.position.x), Some(2.0));
    }

    #[test]
    fn test_unknown_scene_is_empty() {
        let store = SceneStateStore::default();
        assert!(store.get_scene_state("Nowhere").is_empty());
        assert_eq!(store.get_object("Nowhere", "e1"), None);
    }

    #[test]
    fn test_save_scene_state_replaces_mapping() {
        let mut store = SceneStateStore::default();
        store.save_single_object("Town", "old", destroyed_at(0.0));

        let mut records = SceneRecords::new();
        records.insert("new".to_string(), destroyed_at(3.0));
        store.save_scene_state("Town", records);

        let state = store.get_scene_state("Town");
        assert_eq!(state.len(), 1);
        assert!(state.contains_key("new"));
    }

    #[test]
    fn test_export_import() {
        let mut store = SceneStateStore::default();
        store.save_single_object("Crypt_01", "e1", destroyed_at(1.5));
        store.save_single_object("Town", "door", SavedObjectState { destroyed: false, ..destroyed_at(-4.0) });

        let text = store.export_ron().unwrap();

        let mut restored = SceneStateStore::default();
        restored.save_single_object("Stale", "x", destroyed_at(0.0));
        restored.import_ron(&text).unwrap();

        assert_eq!(restored.scenes(), vec!["Crypt_01".to_string(), "Town".to_string()]);
        assert_eq!(restored.get_object("Crypt_01", "e1"), store.get_object("Crypt_01", "e1"));
        assert_eq!(restored.get_object("Town", "door"), store.get_object("Town", "door"));
    }

    #[test]
    fn test_import_garbage_keeps_store() {
        let mut store = SceneStateStore::default();
        store.save_single_object("Town", "door", destroyed_at(0.0));

        assert!(matches!(store.import_ron("not ron at all {"), Err(PersistenceError::Deserialize(_))));
        assert!(store.get_object("Town", "door").is_some());
    }
}
