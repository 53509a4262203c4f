//! Contact damage + knockback
//!
//! Враг с `ContactDamager` бьёт hostile акторов, касающихся его
//! (`contact_radius`), не чаще раза в `interval`. Цель отбрасывается
//! горизонтально от врага на `knockback_force` м/с в течение `knockback_duration`.
//! Захваченная (`Restrained`) цель получает урон, но не сдвигается.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::damage::{DamageIntent, Dead};
use super::grapple::Restrained;
use super::stun::Stunned;
use crate::ai::state::countdown;
use crate::collaborators::{AnimatorHandle, FactionFilter, NavAgent, SpatialQueryProvider};
use crate::components::Actor;

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDamager {
    pub damage: u32,
    pub interval: f32,
    pub contact_radius: f32,
    pub knockback_force: f32,
    pub knockback_duration: f32,
    /// До следующего удара (0 — готов)
    #[serde(skip)]
    pub cooldown: f32,
    #[serde(skip)]
    pub in_contact: bool,
}

impl Default for ContactDamager {
    fn default() -> Self {
        Self {
            damage: 10,
            interval: 2.0,
            contact_radius: 1.2,
            knockback_force: 7.0,
            knockback_duration: 0.5,
            cooldown: 0.0,
            in_contact: false,
        }
    }
}

/// Отбрасывание: навигация цели стоит, пока не истечёт
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub direction: Vec3,
    pub force: f32,
    pub remaining: f32,
}

impl Knockback {
    /// Горизонтально от `from` к `to`
    pub fn away_from(from: Vec3, to: Vec3, force: f32, duration: f32) -> Self {
        let offset = to - from;
        Self {
            direction: Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero(),
            force,
            remaining: duration,
        }
    }
}

/// Система: contact damage
pub fn contact_damage(
    time: Res<Time>,
    mut commands: Commands,
    spatial: Res<SpatialQueryProvider>,
    mut damage_events: EventWriter<DamageIntent>,
    mut damagers: Query<
        (Entity, &Actor, &Transform, &mut ContactDamager, Option<&mut AnimatorHandle>),
        (Without<Stunned>, Without<Dead>),
    >,
    mut agents: Query<&mut NavAgent>,
    restrained: Query<(), With<Restrained>>,
) {
    let dt = time.delta_secs();

    for (entity, actor, transform, mut damager, mut animator) in damagers.iter_mut() {
        countdown(&mut damager.cooldown, dt);

        let position = transform.translation;
        let hits = spatial
            .0
            .find_nearby(position, damager.contact_radius, FactionFilter::HostileTo(actor.faction_id));

        if hits.is_empty() {
            if damager.in_contact {
                damager.in_contact = false;
                if let Some(handle) = animator.as_mut() {
                    handle.0.set_bool("isAttacking", false);
                }
            }
            continue;
        }
        damager.in_contact = true;

        if damager.cooldown > 0.0 {
            continue;
        }

        if let Some(handle) = animator.as_mut() {
            handle.0.set_bool("isAttacking", true);
        }
        for hit in hits {
            damage_events.write(DamageIntent {
                source: Some(entity),
                target: hit.entity,
                amount: damager.damage,
            });

            if hit.restrained || restrained.contains(hit.entity) {
                continue;
            }

            let knockback = Knockback::away_from(
                position,
                hit.position,
                damager.knockback_force,
                damager.knockback_duration,
            );
            if let Ok(mut target_commands) = commands.get_entity(hit.entity) {
                target_commands.insert(knockback);
            }
            if let Ok(mut agent) = agents.get_mut(hit.entity) {
                agent.0.stop();
            }
        }
        damager.cooldown = damager.interval;
    }
}

/// Система: движение отбрасывания, по окончании навигация возвращается
///
/// Захват замораживает отбрасывание до освобождения.
pub fn apply_knockback(
    time: Res<Time>,
    mut commands: Commands,
    mut knocked: Query<(Entity, &mut Transform, &mut Knockback, Option<&mut NavAgent>), Without<Restrained>>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut knockback, agent) in knocked.iter_mut() {
        let step = dt.min(knockback.remaining);
        transform.translation += knockback.direction * knockback.force * step;

        if countdown(&mut knockback.remaining, step) {
            commands.entity(entity).remove::<Knockback>();
            if let Some(mut agent) = agent {
                agent.0.resume();
            }
        }
    }
}
