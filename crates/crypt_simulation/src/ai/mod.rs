//! Enemy AI: FSM + типы врагов
//!
//! Strategic layer: решения (куда идти, когда рвануть, кого бить).
//! Tactical layer (движок): navmesh, анимации, камера — через collaborators.

use bevy::prelude::*;

pub mod brain;
pub mod effects;
pub mod kinds;
pub mod patrol;
pub mod state;
pub mod systems;
pub mod visibility;


pub use brain::{BrainContext, EnemyBrain, DEATH_STATE};
pub use effects::AiEffect;
pub use kinds::{DashConfig, EnemyKind, GrappleConfig, MultiDashConfig, RangedConfig, ShockwaveConfig};
pub use patrol::{choose_patrol_destination, PatrolConfig, PatrolMode};
pub use state::{AIState, BrainMemory, DeathPhase, DeathTiming};
pub use visibility::{is_fully_visible, VisibilityBounds};

use crate::SimulationSet;

/// AI Plugin
///
/// Порядок (FixedUpdate, по SimulationSet):
/// 1. Perception: sync_spatial_index — ECS → spatial index
/// 2. Decision: ai_behavior_tick — FSM тик каждого врага
/// 3. Effects: dispatch_ai_effects — урон / снаряды / захват
/// 4. Motion: headless_navigation_step → advance_animators
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AiEffect>();

        app.add_systems(
            FixedUpdate,
            (
                systems::sync_spatial_index.in_set(SimulationSet::Perception),
                systems::ai_behavior_tick.in_set(SimulationSet::Decision),
                systems::dispatch_ai_effects.in_set(SimulationSet::Effects),
                (systems::headless_navigation_step, systems::advance_animators)
                    .chain()
                    .in_set(SimulationSet::Motion),
            ),
        );
    }
}
