//! Stun controller: оглушение на фиксированное время
//!
//! Пока актор оглушён: brain не тикает, навигация выключена, contact
//! damager молчит, animator держит isStunned. По истечении всё
//! возвращается. Смерть снимает оглушение сразу.

use bevy::prelude::*;

use super::damage::Dead;
use crate::ai::state::countdown;
use crate::collaborators::{AnimatorHandle, NavAgent};
use crate::config::SimulationConfig;
use crate::events::{channels, EventBus};
use crate::logger::log_warning;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Stunned {
    pub remaining: f32,
}

/// Запрос оглушения (duration None → `SimulationConfig::stun_duration`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StunRequest {
    pub target: Entity,
    pub duration: Option<f32>,
}

/// Payload канала Combat/Stun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StunApplied {
    pub entity: Entity,
    pub duration: f32,
    pub active: bool,
}

/// Система: StunRequest → Stunned
pub fn apply_stun_requests(
    mut commands: Commands,
    mut requests: EventReader<StunRequest>,
    config: Res<SimulationConfig>,
    bus: Res<EventBus>,
    targets: Query<(Has<Stunned>, Has<Dead>)>,
    mut agents: Query<&mut NavAgent>,
    mut animators: Query<&mut AnimatorHandle>,
) {
    for request in requests.read() {
        let Ok((already_stunned, dead)) = targets.get(request.target) else {
            log_warning(&format!("Stun: target {:?} does not exist", request.target));
            continue;
        };
        if already_stunned {
            log_warning(&format!("Stun is already active on {:?}", request.target));
            continue;
        }
        if dead {
            continue;
        }

        let duration = request.duration.unwrap_or(config.stun_duration).max(0.0);
        commands.entity(request.target).insert(Stunned { remaining: duration });

        if let Ok(mut agent) = agents.get_mut(request.target) {
            agent.0.set_enabled(false);
        }
        if let Ok(mut handle) = animators.get_mut(request.target) {
            handle.0.set_bool("isStunned", true);
        }

        crate::log(&format!("💫 Stun started on {:?} ({:.1}s)", request.target, duration));
        bus.publish_value(
            channels::COMBAT,
            channels::STUN,
            StunApplied { entity: request.target, duration, active: true },
        );
    }
}

/// Система: таймеры оглушения, по истечении — восстановление
pub fn tick_stuns(
    time: Res<Time>,
    mut commands: Commands,
    bus: Res<EventBus>,
    mut stunned: Query<(
        Entity,
        &mut Stunned,
        Option<&mut NavAgent>,
        Option<&mut AnimatorHandle>,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut stun, agent, animator) in stunned.iter_mut() {
        if !countdown(&mut stun.remaining, dt) {
            continue;
        }

        commands.entity(entity).remove::<Stunned>();
        if let Some(mut agent) = agent {
            agent.0.set_enabled(true);
        }
        if let Some(mut handle) = animator {
            handle.0.set_bool("isStunned", false);
        }

        crate::log(&format!("💫 Stun ended on {:?}", entity));
        bus.publish_value(
            channels::COMBAT,
            channels::STUN,
            StunApplied { entity, duration: 0.0, active: false },
        );
    }
}
