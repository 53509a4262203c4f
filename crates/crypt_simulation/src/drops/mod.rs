//! Item drops с врагов
//!
//! Враг с `EnemyDrop` после смерти роняет все guaranteed предметы плюс,
//! с шансом редкости, один случайный предмет этой редкости. Подбор
//! предметов — на стороне движка, здесь только решение "что упало".

use std::path::Path;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::EnemyBrain;
use crate::config::{parse_ron, read_file, ConfigError, ConfigResult};
use crate::events::{channels, EventBus};
use crate::logger::log_warning;
use crate::{DeterministicRng, SimulationSet};

/// Тег предмета = имя события канала ItemDrop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemTag {
    Key,
    Potion,
    Gold,
    Crystal,
}

impl ItemTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemTag::Key => "Key",
            ItemTag::Potion => "Potion",
            ItemTag::Gold => "Gold",
            ItemTag::Crystal => "Crystal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub name: String,
    pub tag: ItemTag,
}

impl ItemId {
    pub fn new(name: impl Into<String>, tag: ItemTag) -> Self {
        Self { name: name.into(), tag }
    }
}

/// Редкость: шанс (0..=100) и пул предметов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRarity {
    pub name: String,
    pub chance: f32,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub rarities: Vec<DropRarity>,
}

impl DropTable {
    pub fn from_ron_str(text: &str) -> ConfigResult<Self> {
        let table: Self = parse_ron("<drop table>", text)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let table: Self = parse_ron(&path.display().to_string(), &read_file(path)?)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for rarity in &self.rarities {
            if !(0.0..=100.0).contains(&rarity.chance) {
                return Err(ConfigError::Invalid {
                    name: rarity.name.clone(),
                    details: format!("chance must be in 0..=100 (got {})", rarity.chance),
                });
            }
        }
        Ok(())
    }

    /// Поиск без учёта регистра ("boss" == "Boss")
    pub fn rarity(&self, name: &str) -> Option<&DropRarity> {
        self.rarities.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Component: что роняет враг
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDrop {
    /// Имя редкости из DropTable ("Standard", "Mythic", "Boss")
    pub rarity: String,
    pub guaranteed: Vec<ItemId>,
}

/// Событие: предмет упал (payload канала ItemDrop/<tag>)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ItemDropped {
    pub item: ItemId,
    pub position: Vec3,
    pub source: Entity,
}

/// Guaranteed предметы + один бросок по редкости
///
/// roll ∈ [0, 100), предмет падает при roll ≤ chance и непустом пуле.
/// Неизвестная редкость — только guaranteed.
pub fn resolve_drops(drop: &EnemyDrop, table: &DropTable, rng: &mut impl Rng) -> Vec<ItemId> {
    let mut items = drop.guaranteed.clone();

    let Some(rarity) = table.rarity(&drop.rarity) else {
        if !drop.rarity.is_empty() {
            log_warning(&format!("Drops: unknown rarity '{}'", drop.rarity));
        }
        return items;
    };

    let roll: f32 = rng.gen_range(0.0..100.0);
    if roll <= rarity.chance && !rarity.items.is_empty() {
        let index = rng.gen_range(0..rarity.items.len());
        items.push(rarity.items[index].clone());
    }
    items
}

/// Система: враги с доигранной смертью роняют предметы
///
/// Запускается до despawn в том же тике — каждый враг роняет ровно один раз.
pub fn drop_loot_for_finished_enemies(
    table: Res<DropTable>,
    mut rng: ResMut<DeterministicRng>,
    bus: Res<EventBus>,
    mut dropped_events: EventWriter<ItemDropped>,
    enemies: Query<(Entity, &EnemyBrain, &EnemyDrop, &Transform)>,
) {
    let mut finished: Vec<_> = enemies
        .iter()
        .filter(|(_, brain, _, _)| brain.is_finished())
        .collect();
    finished.sort_by_key(|(entity, ..)| *entity);

    for (entity, _, drop, transform) in finished {
        for item in resolve_drops(drop, &table, &mut rng.rng) {
            crate::log(&format!("🎁 {:?} dropped {} ({})", entity, item.name, item.tag.as_str()));
            let dropped = ItemDropped {
                item,
                position: transform.translation,
                source: entity,
            };
            bus.publish_value(channels::ITEM_DROP, dropped.item.tag.as_str(), dropped.clone());
            dropped_events.write(dropped);
        }
    }
}

/// Drops Plugin: DropTable resource (пустая по умолчанию) + система дропа
pub struct DropsPlugin;

impl Plugin for DropsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DropTable>()
            .add_event::<ItemDropped>()
            .add_systems(
                FixedUpdate,
                drop_loot_for_finished_enemies.in_set(SimulationSet::Death),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> DropTable {
        DropTable::from_ron_str(
            r#"(rarities: [
                (name: "Standard", chance: 100.0, items: [(name: "Small Potion", tag: Potion)]),
                (name: "Mythic", chance: 100.0, items: []),
            ])"#,
        )
        .unwrap()
    }

    fn key() -> ItemId {
        ItemId::new("Crypt Key", ItemTag::Key)
    }

    #[test]
    fn test_guaranteed_plus_rarity_roll() {
        let drop = EnemyDrop { rarity: "standard".to_string(), guaranteed: vec![key()] };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let items = resolve_drops(&drop, &table(), &mut rng);

        assert_eq!(items, vec![key(), ItemId::new("Small Potion", ItemTag::Potion)]);
    }

    #[test]
    fn test_unknown_rarity_drops_only_guaranteed() {
        let drop = EnemyDrop { rarity: "Legendary".to_string(), guaranteed: vec![key()] };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(resolve_drops(&drop, &table(), &mut rng), vec![key()]);
    }

    #[test]
    fn test_empty_rarity_pool_drops_nothing_extra() {
        let drop = EnemyDrop { rarity: "Mythic".to_string(), guaranteed: vec![] };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(resolve_drops(&drop, &table(), &mut rng).is_empty());
    }

    #[test]
    fn test_chance_out_of_range_rejected() {
        let result = DropTable::from_ron_str(r#"(rarities: [(name: "Broken", chance: 150.0)])"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
