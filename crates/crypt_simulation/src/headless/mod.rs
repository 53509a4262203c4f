//! Headless реализации collaborators
//!
//! Используются в `create_headless_app`, CLI прогоне и тестах.
//! Никакой физики: brute-force spatial index, кинематический агент по прямой,
//! записывающий animator и перспективная камера.

pub mod animator;
pub mod camera;
pub mod navigator;
pub mod spatial;

pub use animator::RecordingAnimator;
pub use camera::PerspectiveViewport;
pub use navigator::KinematicNavigator;
pub use spatial::HeadlessSpatialIndex;

use bevy::prelude::*;

use crate::collaborators::{AnimatorHandle, NavAgent};
use crate::config::{EnemyDefinition, SimulationConfig};

/// Спавн врага с headless collaborators
///
/// Возвращает клон animator'а: запись общая, флаги видны снаружи.
pub fn spawn_headless_enemy(
    commands: &mut Commands,
    definition: &EnemyDefinition,
    position: Vec3,
    scene_id: Option<&str>,
    config: &SimulationConfig,
) -> (Entity, RecordingAnimator) {
    let entity = definition.spawn(commands, position, scene_id, config);
    let animator = RecordingAnimator::default();
    let navigator = KinematicNavigator::new(definition.move_speed)
        .at(position)
        .with_walkable_area(position, definition.patrol.area_radius * 1.5);

    commands
        .entity(entity)
        .insert((NavAgent::new(navigator), AnimatorHandle::new(animator.clone())));
    (entity, animator)
}
