//! Определения врагов (assets/enemies/*.ron)
//!
//! Имя в реестре = file stem ("dasher.ron" → "dasher").

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{parse_ron, read_file, ConfigError, ConfigResult, SimulationConfig};
use crate::ai::{EnemyBrain, EnemyKind, PatrolConfig, VisibilityBounds};
use crate::combat::ContactDamager;
use crate::components::{Actor, Health, ENEMY_FACTION};
use crate::drops::EnemyDrop;
use crate::persistence::SceneObject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDefinition {
    pub name: String,
    pub kind: EnemyKind,
    pub max_health: u32,
    pub detection_radius: f32,
    /// Скорость navmesh agent'а (headless навигатор)
    pub move_speed: f32,
    pub faction_id: u64,
    pub patrol: PatrolConfig,
    pub contact: Option<ContactDamager>,
    pub drop: Option<EnemyDrop>,
}

impl Default for EnemyDefinition {
    fn default() -> Self {
        Self {
            name: "Enemy".to_string(),
            kind: EnemyKind::Chaser,
            max_health: 100,
            detection_radius: 10.0,
            move_speed: 3.5,
            faction_id: ENEMY_FACTION,
            patrol: PatrolConfig::default(),
            contact: None,
            drop: None,
        }
    }
}

impl EnemyDefinition {
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |details: String| ConfigError::Invalid {
            name: self.name.clone(),
            details,
        };
        if self.max_health == 0 {
            return Err(invalid("max_health must be ≥ 1".to_string()));
        }
        if !(self.detection_radius.is_finite() && self.detection_radius > 0.0) {
            return Err(invalid(format!("detection_radius must be > 0 (got {})", self.detection_radius)));
        }
        if self.patrol.max_wait < self.patrol.min_wait || self.patrol.min_wait < 0.0 {
            return Err(invalid("patrol wait range must satisfy 0 ≤ min_wait ≤ max_wait".to_string()));
        }
        self.kind.validate().map_err(invalid)
    }

    pub fn brain(&self, config: &SimulationConfig) -> EnemyBrain {
        EnemyBrain::new(self.kind.clone())
            .with_detection_radius(self.detection_radius)
            .with_patrol(self.patrol.clone())
            .with_death_timing(config.death_timing())
    }

    /// Спавн ECS части врага (без collaborators — их даёт хост).
    /// Patrol центр = точка спавна.
    pub fn spawn(
        &self,
        commands: &mut Commands,
        position: Vec3,
        scene_id: Option<&str>,
        config: &SimulationConfig,
    ) -> Entity {
        let mut brain = self.brain(config);
        brain.patrol.center = position;

        let mut entity = commands.spawn((
            Name::new(self.name.clone()),
            Actor::new(self.faction_id),
            Health::new(self.max_health),
            Transform::from_translation(position),
            brain,
            VisibilityBounds::default(),
        ));
        if let Some(contact) = &self.contact {
            entity.insert(contact.clone());
        }
        if let Some(drop) = &self.drop {
            entity.insert(drop.clone());
        }
        if let Some(id) = scene_id {
            entity.insert(SceneObject::new(id));
        }
        entity.id()
    }
}

/// Resource: все загруженные определения врагов
#[derive(Resource, Debug, Clone, Default)]
pub struct EnemyRegistry {
    definitions: BTreeMap<String, EnemyDefinition>,
}

impl EnemyRegistry {
    /// Все *.ron из директории. Любой битый файл — ошибка всей загрузки.
    pub fn load_dir(dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| ConfigError::Io {
            path: dir.display().to_string(),
            details: e.to_string(),
        })?;

        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();

        let mut registry = Self::default();
        for path in paths {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let definition: EnemyDefinition = parse_ron(&path.display().to_string(), &read_file(&path)?)?;
            definition.validate()?;
            crate::log(&format!("👹 Loaded enemy definition: {} ({})", stem, definition.kind.name()));
            registry.definitions.insert(stem, definition);
        }
        Ok(registry)
    }

    pub fn insert_ron(&mut self, key: &str, text: &str) -> ConfigResult<()> {
        let definition: EnemyDefinition = parse_ron(key, text)?;
        definition.validate()?;
        self.definitions.insert(key.to_string(), definition);
        Ok(())
    }

    pub fn insert(&mut self, key: &str, definition: EnemyDefinition) {
        self.definitions.insert(key.to_string(), definition);
    }

    pub fn get(&self, key: &str) -> ConfigResult<&EnemyDefinition> {
        self.definitions
            .get(key)
            .ok_or_else(|| ConfigError::UnknownEnemy(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
