//! Захват: цель обездвижена, пока держащий её враг жив и в Grappling

use bevy::prelude::*;

use crate::ai::EnemyBrain;
use crate::collaborators::AnimatorHandle;
use crate::events::{channels, EventBus};

/// Актор обездвижен (контроллер выключен, навигация не идёт)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Restrained {
    pub holder: Entity,
}

/// Payload канала Combat/Grapple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrappleChanged {
    pub holder: Entity,
    pub target: Entity,
    pub active: bool,
}

/// Система: гарантированное освобождение
///
/// Держащий пропал (despawn), умер или уже не в Grappling на эту цель →
/// Restrained снимается.
pub fn release_orphaned_holds(
    mut commands: Commands,
    bus: Res<EventBus>,
    held: Query<(Entity, &Restrained)>,
    holders: Query<&EnemyBrain>,
    mut animators: Query<&mut AnimatorHandle>,
) {
    for (target, hold) in held.iter() {
        let still_held = holders
            .get(hold.holder)
            .is_ok_and(|brain| brain.grappled_target() == Some(target));
        if still_held {
            continue;
        }

        commands.entity(target).remove::<Restrained>();
        if let Ok(mut handle) = animators.get_mut(target) {
            handle.0.set_bool("isStunned", false);
        }

        crate::log(&format!("🔓 Orphaned hold on {:?} released (holder {:?})", target, hold.holder));
        bus.publish_value(
            channels::COMBAT,
            channels::GRAPPLE,
            GrappleChanged { holder: hold.holder, target, active: false },
        );
    }
}
