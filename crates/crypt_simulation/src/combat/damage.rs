//! Damage / healing применение
//!
//! Урон приходит намерением (`DamageIntent`) от AI, contact damager'ов или
//! хоста (оружие игрока). Здесь же события для UI и шины.

use bevy::prelude::*;

use crate::components::Health;
use crate::events::{channels, EventBus};
use crate::logger::log_warning;

/// Намерение нанести урон (ещё не применён)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageIntent {
    pub source: Option<Entity>,
    pub target: Entity,
    pub amount: u32,
}

/// Намерение вылечить
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealIntent {
    pub target: Entity,
    pub amount: u32,
}

/// Событие: урон нанесен
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: здоровье изменилось (payload канала Health/Change)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

/// Событие: entity умер (health 1 → 0). Payload канала Health/Died.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health == 0)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Система: DamageIntent → Health
///
/// 1. Нулевой урон и урон по мёртвым игнорируются
/// 2. Health/Change на каждое изменение
/// 3. EntityDied + Health/Died ровно один раз (переход в 0)
pub fn apply_damage(
    mut intents: EventReader<DamageIntent>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut changed_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<EntityDied>,
    bus: Res<EventBus>,
    mut targets: Query<&mut Health>,
) {
    for intent in intents.read() {
        if intent.amount == 0 {
            continue;
        }
        let Ok(mut health) = targets.get_mut(intent.target) else {
            log_warning(&format!("DamageIntent: target {:?} has no Health component", intent.target));
            continue;
        };
        if health.is_dead() {
            continue;
        }

        let applied = health.take_damage(intent.amount);
        let target_died = health.is_dead();

        dealt_events.write(DamageDealt {
            attacker: intent.source,
            target: intent.target,
            damage: applied,
            target_died,
        });

        let changed = HealthChanged {
            entity: intent.target,
            current: health.current,
            max: health.max,
        };
        changed_events.write(changed);
        bus.publish_value(channels::HEALTH, channels::HEALTH_CHANGE, changed);

        if target_died {
            crate::log(&format!("💀 Entity {:?} killed by {:?}", intent.target, intent.source));
            let died = EntityDied {
                entity: intent.target,
                killer: intent.source,
            };
            died_events.write(died);
            bus.publish_value(channels::HEALTH, channels::HEALTH_DIED, died);
        }
    }
}

/// Система: HealIntent → Health (мёртвых не лечим)
pub fn apply_healing(
    mut intents: EventReader<HealIntent>,
    mut changed_events: EventWriter<HealthChanged>,
    bus: Res<EventBus>,
    mut targets: Query<&mut Health>,
) {
    for intent in intents.read() {
        let Ok(mut health) = targets.get_mut(intent.target) else {
            log_warning(&format!("HealIntent: target {:?} has no Health component", intent.target));
            continue;
        };
        if intent.amount == 0 || health.is_dead() {
            continue;
        }

        health.heal(intent.amount);
        let changed = HealthChanged {
            entity: intent.target,
            current: health.current,
            max: health.max,
        };
        changed_events.write(changed);
        bus.publish_value(channels::HEALTH, channels::HEALTH_CHANGE, changed);
    }
}
