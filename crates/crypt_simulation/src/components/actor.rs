//! Базовые компоненты акторов: Actor, Health, Player

use bevy::prelude::*;

/// Фракция игрока (и компаньонов)
pub const PLAYER_FACTION: u64 = 1;
/// Фракция врагов подземелья
pub const ENEMY_FACTION: u64 = 2;

/// Актор (игрок, враг, компаньон) — базовый компонент для живых существ
///
/// Автоматически добавляет Health и Transform через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform)]
pub struct Actor {
    /// Stable ID фракции (враги = все с другим faction_id)
    pub faction_id: u64,
}

impl Actor {
    pub fn new(faction_id: u64) -> Self {
        Self { faction_id }
    }

    pub fn is_hostile_to(&self, other: &Actor) -> bool {
        self.faction_id != other.faction_id
    }
}

/// Маркер игрока
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Здоровье актора (целочисленное)
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Возвращает фактически снятое HP
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before - self.current
    }

    pub fn heal(&mut self, amount: u32) {
        if self.is_dead() {
            return; // Мёртвых не лечим
        }
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}
