//! Контракты с внешним движком (collaborators)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (AI решения, урон, persistence)
//! - Движок = tactical layer (physics broad-phase, navmesh, анимации, камера)
//!
//! Симуляция никогда не трогает движок напрямую — только через эти traits.
//! Хост подставляет реальные реализации, headless режим — `crate::headless`.

use bevy::prelude::*;

/// Фильтр фракций для spatial query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactionFilter {
    /// Все акторы
    Any,
    /// Только указанная фракция
    Only(u64),
    /// Все, кроме указанной фракции (враги observer'а)
    HostileTo(u64),
}

impl FactionFilter {
    pub fn accepts(&self, faction_id: u64) -> bool {
        match self {
            FactionFilter::Any => true,
            FactionFilter::Only(id) => faction_id == *id,
            FactionFilter::HostileTo(id) => faction_id != *id,
        }
    }
}

/// Результат spatial query: актор рядом с точкой
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyActor {
    pub entity: Entity,
    pub position: Vec3,
    pub faction_id: u64,
    /// Актор уже обездвижен (захват, оглушение игрока)
    pub restrained: bool,
}

/// Снимок актора для headless spatial index (ECS → index sync)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSnapshot {
    pub entity: Entity,
    pub position: Vec3,
    pub faction_id: u64,
    pub alive: bool,
    pub restrained: bool,
}

/// Spatial query (physics broad-phase на стороне движка)
pub trait SpatialQuery: Send + Sync {
    /// Акторы в радиусе, отсортированные по расстоянию (ближайший первый).
    fn find_nearby(&self, center: Vec3, radius: f32, filter: FactionFilter) -> Vec<NearbyActor>;

    /// Есть ли препятствие в сфере `radius` вокруг точки.
    fn is_obstructed(&self, point: Vec3, radius: f32) -> bool;

    /// Headless index обновляется из ECS; движковые реализации игнорируют.
    fn sync_actors(&mut self, _actors: &[ActorSnapshot]) {}
}

/// Path follower (navmesh agent на стороне движка)
pub trait Navigator: Send + Sync {
    fn set_destination(&mut self, point: Vec3);
    fn destination(&self) -> Option<Vec3>;
    fn is_path_complete(&self) -> bool;
    fn remaining_distance(&self) -> f32;
    fn stopping_distance(&self) -> f32;
    fn stop(&mut self);
    fn resume(&mut self);
    fn is_stopped(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    fn velocity(&self) -> Vec3;

    /// Ближайшая достижимая точка в пределах `max_distance` (None — недостижимо).
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Один шаг движения (headless). Движок двигает агента сам и возвращает позицию как есть.
    fn advance(&mut self, position: Vec3, _dt: f32) -> Vec3 {
        position
    }

    /// Агент дошёл до цели (путь построен и осталось ≤ stopping distance)
    fn has_arrived(&self) -> bool {
        self.is_path_complete() && self.remaining_distance() <= self.stopping_distance()
    }
}

/// Animation controller (state machine анимаций на стороне движка)
pub trait Animator: Send + Sync {
    fn set_bool(&mut self, name: &str, value: bool);
    fn get_bool(&self, name: &str) -> bool;
    fn set_trigger(&mut self, name: &str);
    fn current_state_name(&self) -> String;
    fn normalized_time(&self) -> f32;

    /// Продвинуть проигрывание (headless). Движок анимирует сам.
    fn advance(&mut self, _dt: f32) {}
}

/// Проекция мировой точки в viewport камеры
///
/// x, y ∈ [0, 1] внутри экрана, z — глубина (> 0 перед камерой).
pub trait ViewportProjector: Send + Sync {
    fn world_to_viewport(&self, point: Vec3) -> Vec3;
}

/// Component: navmesh agent актора
#[derive(Component)]
pub struct NavAgent(pub Box<dyn Navigator>);

impl NavAgent {
    pub fn new(navigator: impl Navigator + 'static) -> Self {
        Self(Box::new(navigator))
    }

    pub fn as_dyn_mut(&mut self) -> &mut dyn Navigator {
        self.0.as_mut()
    }
}

/// Component: animation controller актора
#[derive(Component)]
pub struct AnimatorHandle(pub Box<dyn Animator>);

impl AnimatorHandle {
    pub fn new(animator: impl Animator + 'static) -> Self {
        Self(Box::new(animator))
    }

    pub fn as_dyn_mut(&mut self) -> &mut dyn Animator {
        self.0.as_mut()
    }
}

/// Resource: spatial query провайдер (один на мир)
#[derive(Resource)]
pub struct SpatialQueryProvider(pub Box<dyn SpatialQuery>);

impl SpatialQueryProvider {
    pub fn new(query: impl SpatialQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

/// Resource: активная камера (опционально — без неё visibility gate всегда false)
#[derive(Resource)]
pub struct CameraView(pub Box<dyn ViewportProjector>);

impl CameraView {
    pub fn new(projector: impl ViewportProjector + 'static) -> Self {
        Self(Box::new(projector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_filter() {
        assert!(FactionFilter::Any.accepts(7));
        assert!(FactionFilter::Only(1).accepts(1));
        assert!(!FactionFilter::Only(1).accepts(2));
        assert!(FactionFilter::HostileTo(1).accepts(2));
        assert!(!FactionFilter::HostileTo(1).accepts(1));
    }
}
