//! Brute-force spatial index (O(n) на запрос, для headless сцен хватает)

use bevy::prelude::*;

use crate::collaborators::{ActorSnapshot, FactionFilter, NearbyActor, SpatialQuery};

/// Сферическое препятствие (колонна, сундук, стена-заглушка)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessSpatialIndex {
    actors: Vec<ActorSnapshot>,
    obstacles: Vec<Obstacle>,
}

impl HeadlessSpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_obstacle(mut self, center: Vec3, radius: f32) -> Self {
        self.obstacles.push(Obstacle { center, radius });
        self
    }

    pub fn add_obstacle(&mut self, center: Vec3, radius: f32) {
        self.obstacles.push(Obstacle { center, radius });
    }

    pub fn actors(&self) -> &[ActorSnapshot] {
        &self.actors
    }
}

impl SpatialQuery for HeadlessSpatialIndex {
    fn find_nearby(&self, center: Vec3, radius: f32, filter: FactionFilter) -> Vec<NearbyActor> {
        let mut hits: Vec<(f32, NearbyActor)> = self
            .actors
            .iter()
            .filter(|a| a.alive && filter.accepts(a.faction_id))
            .map(|a| (a.position.distance(center), a))
            .filter(|(distance, _)| *distance <= radius)
            .map(|(distance, a)| {
                (
                    distance,
                    NearbyActor {
                        entity: a.entity,
                        position: a.position,
                        faction_id: a.faction_id,
                        restrained: a.restrained,
                    },
                )
            })
            .collect();

        // Ближайший первый; при равенстве — по Entity index (детерминизм)
        hits.sort_by(|(da, a), (db, b)| {
            da.total_cmp(db)
                .then_with(|| a.entity.index().cmp(&b.entity.index()))
        });

        hits.into_iter().map(|(_, actor)| actor).collect()
    }

    fn is_obstructed(&self, point: Vec3, radius: f32) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.center.distance(point) < o.radius + radius)
    }

    fn sync_actors(&mut self, actors: &[ActorSnapshot]) {
        self.actors.clear();
        self.actors.extend_from_slice(actors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(index: u32, position: Vec3, faction_id: u64) -> ActorSnapshot {
        ActorSnapshot {
            entity: Entity::from_raw(index),
            position,
            faction_id,
            alive: true,
            restrained: false,
        }
    }

    #[test]
    fn test_find_nearby_sorted_and_filtered() {
        let mut index = HeadlessSpatialIndex::new();
        index.sync_actors(&[
            snapshot(1, Vec3::new(6.0, 0.0, 0.0), 0),
            snapshot(2, Vec3::new(2.0, 0.0, 0.0), 0),
            snapshot(3, Vec3::new(1.0, 0.0, 0.0), 1), // Союзник observer'а
            snapshot(4, Vec3::new(20.0, 0.0, 0.0), 0), // Вне радиуса
        ]);

        let hits = index.find_nearby(Vec3::ZERO, 10.0, FactionFilter::HostileTo(1));
        let entities: Vec<u32> = hits.iter().map(|h| h.entity.index()).collect();
        assert_eq!(entities, vec![2, 1]);
    }

    #[test]
    fn test_dead_actors_are_invisible() {
        let mut index = HeadlessSpatialIndex::new();
        let mut dead = snapshot(1, Vec3::ZERO, 0);
        dead.alive = false;
        index.sync_actors(&[dead]);

        assert!(index.find_nearby(Vec3::ZERO, 5.0, FactionFilter::Any).is_empty());
    }

    #[test]
    fn test_obstacle_check() {
        let index = HeadlessSpatialIndex::new().with_obstacle(Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(index.is_obstructed(Vec3::new(5.5, 0.0, 0.0), 0.5));
        assert!(!index.is_obstructed(Vec3::new(8.0, 0.0, 0.0), 0.5));
    }
}
