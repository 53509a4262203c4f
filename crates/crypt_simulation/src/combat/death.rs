//! Смерть врагов: отключение AI → доигрывание анимации → уборка со сцены

use bevy::prelude::*;

use super::contact::Knockback;
use super::damage::{Dead, EntityDied};
use super::stun::Stunned;
use crate::ai::{AiEffect, BrainContext, EnemyBrain, VisibilityBounds};
use crate::collaborators::{AnimatorHandle, NavAgent, SpatialQueryProvider};
use crate::components::Actor;
use crate::events::{channels, EventBus};
use crate::DeterministicRng;

/// Событие: враг доиграл смерть и убран со сцены
/// (payload канала Enemies/Died)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EnemyRemoved {
    pub entity: Entity,
    pub kind: String,
    pub position: Vec3,
}

/// Система: отключение AI при смерти
///
/// Маркер Dead всем умершим; у врагов brain → Disabled (навигация
/// выключена, isDead, захват отпущен). Оглушение и отбрасывание снимаются.
/// Release эффект уходит событием и применяется на следующем тике;
/// `release_orphaned_holds` отпускает цель уже в этом.
pub fn disable_ai_on_death(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    spatial: Res<SpatialQueryProvider>,
    mut rng: ResMut<DeterministicRng>,
    mut effect_events: EventWriter<AiEffect>,
    mut enemies: Query<(
        &Actor,
        &mut EnemyBrain,
        &mut Transform,
        Option<&mut NavAgent>,
        Option<&mut AnimatorHandle>,
        Option<&VisibilityBounds>,
    )>,
) {
    let mut effects = Vec::new();

    for death in deaths.read() {
        let Ok(mut entity_commands) = commands.get_entity(death.entity) else {
            continue;
        };
        entity_commands.insert(Dead).remove::<(Stunned, Knockback)>();

        let Ok((actor, mut brain, mut transform, nav, animator, bounds)) = enemies.get_mut(death.entity) else {
            continue;
        };
        let mut ctx = BrainContext {
            entity: death.entity,
            faction_id: actor.faction_id,
            transform: &mut *transform,
            navigator: nav.map(|agent| agent.into_inner().as_dyn_mut()),
            animator: animator.map(|handle| handle.into_inner().as_dyn_mut()),
            spatial: spatial.0.as_ref(),
            camera: None,
            bounds,
            rng: &mut rng.rng,
            effects: &mut effects,
        };
        brain.disable(&mut ctx);
    }

    for effect in effects {
        effect_events.write(effect);
    }
}

/// Система: враги с доигранной смертью → Enemies/Died + despawn
pub fn despawn_finished_enemies(
    mut commands: Commands,
    bus: Res<EventBus>,
    mut removed_events: EventWriter<EnemyRemoved>,
    enemies: Query<(Entity, &EnemyBrain, &Transform)>,
) {
    for (entity, brain, transform) in enemies.iter() {
        if !brain.is_finished() {
            continue;
        }

        let removed = EnemyRemoved {
            entity,
            kind: brain.kind.name().to_string(),
            position: transform.translation,
        };
        crate::log(&format!("🗑️ {} {:?} removed", removed.kind, entity));
        bus.publish_value(channels::ENEMIES, channels::ENEMY_DIED, removed.clone());
        removed_events.write(removed);

        commands.entity(entity).despawn();
    }
}
