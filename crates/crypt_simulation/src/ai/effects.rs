//! Побочные эффекты решений AI
//!
//! Brain не трогает чужие entity напрямую: всё, что касается других акторов
//! (урон, снаряды, захват), уходит событием и применяется
//! `dispatch_ai_effects` после тика всех врагов.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum AiEffect {
    /// Урон цели (удар в захвате, shockwave)
    Damage {
        source: Entity,
        target: Entity,
        amount: u32,
    },
    /// Выстрел (сам снаряд спавнит движок)
    FireProjectile {
        shooter: Entity,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
    },
    /// Захват: цель обездвижена
    Grapple { holder: Entity, target: Entity },
    /// Конец захвата
    Release { holder: Entity, target: Entity },
}
