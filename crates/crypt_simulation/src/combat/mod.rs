//! Combat: урон, смерть, оглушение, захват, contact damage
//!
//! ECS ответственность:
//! - Game state: Health, Stunned, Restrained, Knockback
//! - Combat rules: применение урона, смерть, освобождение захвата
//! - Events: DamageDealt, HealthChanged, EntityDied, EnemyRemoved
//!
//! Движок ответственность:
//! - Коллизии оружия игрока и снарядов (возвращаются как DamageIntent)
//! - Анимации ударов

use bevy::prelude::*;

pub mod contact;
pub mod damage;
pub mod death;
pub mod grapple;
pub mod projectile;
pub mod stun;

#[cfg(test)]
mod damage_tests;

pub use contact::{ContactDamager, Knockback};
pub use damage::{DamageDealt, DamageIntent, Dead, EntityDied, HealIntent, HealthChanged};
pub use death::EnemyRemoved;
pub use grapple::{GrappleChanged, Restrained};
pub use projectile::ProjectileFired;
pub use stun::{StunApplied, StunRequest, Stunned};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок (FixedUpdate, по SimulationSet):
/// 1. Perception: tick_stuns → apply_stun_requests
/// 2. Effects: contact_damage
/// 3. Motion: apply_knockback
/// 4. Resolution: apply_healing → apply_damage → disable_ai_on_death
/// 5. Cleanup: release_orphaned_holds → despawn_finished_enemies
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageIntent>()
            .add_event::<HealIntent>()
            .add_event::<DamageDealt>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>()
            .add_event::<EnemyRemoved>()
            .add_event::<StunRequest>()
            .add_event::<ProjectileFired>();

        app.add_systems(
            FixedUpdate,
            (
                (stun::tick_stuns, stun::apply_stun_requests)
                    .chain()
                    .in_set(SimulationSet::Perception),
                contact::contact_damage.in_set(SimulationSet::Effects),
                contact::apply_knockback.in_set(SimulationSet::Motion),
                (damage::apply_healing, damage::apply_damage, death::disable_ai_on_death)
                    .chain()
                    .in_set(SimulationSet::Resolution),
                (grapple::release_orphaned_holds, death::despawn_finished_enemies)
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
