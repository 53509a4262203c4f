//! AI системы (FixedUpdate)
//!
//! ECS → collaborators: каждый тик собираем `BrainContext` из компонентов
//! и ресурсов, brain решает, эффекты уходят событиями.

use bevy::prelude::*;

use super::brain::{BrainContext, EnemyBrain};
use super::effects::AiEffect;
use super::visibility::VisibilityBounds;
use crate::collaborators::{ActorSnapshot, AnimatorHandle, CameraView, NavAgent, SpatialQueryProvider};
use crate::combat::{DamageIntent, GrappleChanged, Knockback, ProjectileFired, Restrained, Stunned};
use crate::components::{Actor, Health};
use crate::events::{channels, EventBus};
use crate::logger::log_warning;
use crate::DeterministicRng;

/// Система: ECS акторы → spatial index
///
/// Снимки отсортированы по entity: одинаковый порядок результатов
/// `find_nearby` при равных дистанциях на любом запуске.
pub fn sync_spatial_index(
    mut provider: ResMut<SpatialQueryProvider>,
    actors: Query<(Entity, &Actor, &Transform, &Health, Has<Restrained>)>,
) {
    let mut snapshots: Vec<ActorSnapshot> = actors
        .iter()
        .map(|(entity, actor, transform, health, restrained)| ActorSnapshot {
            entity,
            position: transform.translation,
            faction_id: actor.faction_id,
            alive: health.is_alive(),
            restrained,
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.entity);

    provider.0.sync_actors(&snapshots);
}

/// Система: один тик FSM каждого врага
///
/// Оглушённые пропускаются целиком (таймеры стоят).
/// Порядок обхода — по entity, иначе RNG расходится между запусками.
pub fn ai_behavior_tick(
    time: Res<Time>,
    spatial: Res<SpatialQueryProvider>,
    camera: Option<Res<CameraView>>,
    mut rng: ResMut<DeterministicRng>,
    mut effect_events: EventWriter<AiEffect>,
    mut enemies: Query<
        (
            Entity,
            &Actor,
            &mut EnemyBrain,
            &mut Transform,
            Option<&mut NavAgent>,
            Option<&mut AnimatorHandle>,
            Option<&VisibilityBounds>,
        ),
        Without<Stunned>,
    >,
) {
    let dt = time.delta_secs();
    let camera = camera.as_deref().map(|view| view.0.as_ref());

    let mut order: Vec<Entity> = enemies.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    let mut effects = Vec::new();
    for entity in order {
        let Ok((entity, actor, mut brain, mut transform, nav, animator, bounds)) = enemies.get_mut(entity)
        else {
            continue;
        };

        let mut ctx = BrainContext {
            entity,
            faction_id: actor.faction_id,
            transform: &mut *transform,
            navigator: nav.map(|agent| agent.into_inner().as_dyn_mut()),
            animator: animator.map(|handle| handle.into_inner().as_dyn_mut()),
            spatial: spatial.0.as_ref(),
            camera,
            bounds,
            rng: &mut rng.rng,
            effects: &mut effects,
        };
        brain.tick(&mut ctx, dt);
    }

    for effect in effects {
        effect_events.write(effect);
    }
}

/// Система: AiEffect → события combat / компоненты
///
/// Одну цель держит один захват: если цель уже `Restrained` (или её
/// схватили раньше в этом же батче), опоздавший brain уходит в Cooldown.
pub fn dispatch_ai_effects(
    mut commands: Commands,
    mut effects: EventReader<AiEffect>,
    mut damage_events: EventWriter<DamageIntent>,
    mut fired_events: EventWriter<ProjectileFired>,
    bus: Res<EventBus>,
    restrained: Query<&Restrained>,
    mut brains: Query<(&mut EnemyBrain, Option<&mut NavAgent>)>,
    mut animators: Query<&mut AnimatorHandle>,
) {
    let mut claimed: Vec<Entity> = Vec::new();

    for effect in effects.read() {
        match effect {
            AiEffect::Damage { source, target, amount } => {
                damage_events.write(DamageIntent {
                    source: Some(*source),
                    target: *target,
                    amount: *amount,
                });
            }
            AiEffect::FireProjectile { shooter, origin, direction, speed } => {
                let fired = ProjectileFired {
                    shooter: *shooter,
                    origin: *origin,
                    direction: *direction,
                    speed: *speed,
                };
                bus.publish_value(channels::COMBAT, channels::PROJECTILE_FIRED, fired.clone());
                fired_events.write(fired);
            }
            AiEffect::Grapple { holder, target } => {
                let held_by_other = restrained.get(*target).is_ok_and(|hold| hold.holder != *holder);
                if held_by_other || claimed.contains(target) {
                    if let Ok((mut brain, agent)) = brains.get_mut(*holder) {
                        if brain.abandon_grapple(*target) {
                            if let Some(mut agent) = agent {
                                agent.0.resume();
                            }
                            if let Ok(mut handle) = animators.get_mut(*holder) {
                                handle.0.set_bool("isAttacking", false);
                            }
                        }
                    }
                    crate::log(&format!("AI: {:?} lost grapple on {:?}, already held", holder, target));
                    continue;
                }

                let Ok(mut target_commands) = commands.get_entity(*target) else {
                    log_warning(&format!("AI: grapple target {:?} no longer exists", target));
                    continue;
                };
                target_commands.insert(Restrained { holder: *holder });
                claimed.push(*target);
                if let Ok(mut handle) = animators.get_mut(*target) {
                    handle.0.set_bool("isStunned", true);
                }
                crate::log(&format!("🪤 {:?} grappled {:?}", holder, target));
                bus.publish_value(
                    channels::COMBAT,
                    channels::GRAPPLE,
                    GrappleChanged { holder: *holder, target: *target, active: true },
                );
            }
            AiEffect::Release { holder, target } => {
                // Чужой захват не трогаем
                if restrained.get(*target).map_or(true, |hold| hold.holder != *holder) {
                    continue;
                }
                if let Ok(mut target_commands) = commands.get_entity(*target) {
                    target_commands.remove::<Restrained>();
                }
                if let Ok(mut handle) = animators.get_mut(*target) {
                    handle.0.set_bool("isStunned", false);
                }
                crate::log(&format!("🔓 {:?} released {:?}", holder, target));
                bus.publish_value(
                    channels::COMBAT,
                    channels::GRAPPLE,
                    GrappleChanged { holder: *holder, target: *target, active: false },
                );
            }
        }
    }
}

/// Система: headless шаг навигации (движок двигает агентов сам)
///
/// Обездвиженные и отбрасываемые акторы не идут по пути.
pub fn headless_navigation_step(
    time: Res<Time>,
    mut agents: Query<(&mut Transform, &mut NavAgent), (Without<Restrained>, Without<Knockback>)>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut agent) in agents.iter_mut() {
        let next = agent.0.advance(transform.translation, dt);
        if next != transform.translation {
            transform.translation = next;
        }
    }
}

/// Система: headless проигрывание анимаций
pub fn advance_animators(time: Res<Time>, mut animators: Query<&mut AnimatorHandle>) {
    let dt = time.delta_secs();
    for mut handle in animators.iter_mut() {
        handle.0.advance(dt);
    }
}
