//! Выстрелы ranged врагов
//!
//! Сам снаряд (полёт, коллизия) живёт в движке. Попадание возвращается
//! обратно как `DamageIntent`.

use bevy::prelude::*;

/// Событие: враг выстрелил (payload канала Combat/ProjectileFired)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileFired {
    pub shooter: Entity,
    pub origin: Vec3,
    /// Нормализованное направление
    pub direction: Vec3,
    pub speed: f32,
}
