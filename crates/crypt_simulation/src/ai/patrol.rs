//! Выбор patrol точки
//!
//! Два режима:
//! - RandomInArea: случайная точка в диске вокруг центра, snap на navmesh
//! - PointSet: 4 угла квадрата + центр, перемешиваем и берём первую
//!   достижимую, свободную от препятствий и не слишком близкую точку
//!
//! Неудача не фатальна: вызывающий остаётся на месте и всё равно
//! сбрасывает таймер ожидания (иначе patrol залипает).

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collaborators::{Navigator, SpatialQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatrolMode {
    #[default]
    RandomInArea,
    PointSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub mode: PatrolMode,
    pub center: Vec3,
    pub area_radius: f32,
    pub min_wait: f32,
    pub max_wait: f32,
    /// PointSet: точка должна быть не ближе к текущей позиции
    pub min_point_distance: f32,
    /// PointSet: радиус проверки препятствий вокруг точки
    pub obstacle_check_radius: f32,
    /// PointSet: максимальный snap на navmesh
    pub reachability_tolerance: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            mode: PatrolMode::RandomInArea,
            center: Vec3::ZERO,
            area_radius: 20.0,
            min_wait: 2.0,
            max_wait: 5.0,
            min_point_distance: 3.0,
            obstacle_check_radius: 1.0,
            reachability_tolerance: 1.0,
        }
    }
}

impl PatrolConfig {
    /// Углы квадрата, вписанного в patrol диск, + центр
    pub fn point_set(&self) -> [Vec3; 5] {
        let d = self.area_radius / std::f32::consts::SQRT_2;
        let c = self.center;
        [
            c + Vec3::new(d, 0.0, d),
            c + Vec3::new(d, 0.0, -d),
            c + Vec3::new(-d, 0.0, d),
            c + Vec3::new(-d, 0.0, -d),
            c,
        ]
    }

    /// Равномерно в [min_wait, max_wait)
    pub fn roll_wait(&self, rng: &mut impl Rng) -> f32 {
        if self.max_wait > self.min_wait {
            rng.gen_range(self.min_wait..self.max_wait)
        } else {
            self.min_wait.max(0.0)
        }
    }
}

/// Выбирает следующую patrol точку. None — подходящей нет (держим позицию).
pub fn choose_patrol_destination(
    config: &PatrolConfig,
    current: Vec3,
    navigator: &dyn Navigator,
    spatial: &dyn SpatialQuery,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    match config.mode {
        PatrolMode::RandomInArea => {
            // Равномерно по площади диска
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let distance = rng.gen::<f32>().sqrt() * config.area_radius;
            let point = config.center + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);
            navigator.sample_position(point, config.area_radius)
        }
        PatrolMode::PointSet => {
            let mut candidates = config.point_set();
            candidates.shuffle(rng);

            candidates.into_iter().find_map(|point| {
                let reachable = navigator.sample_position(point, config.reachability_tolerance)?;
                if spatial.is_obstructed(reachable, config.obstacle_check_radius) {
                    return None;
                }
                let offset = reachable - current;
                let far_enough = Vec3::new(offset.x, 0.0, offset.z).length() >= config.min_point_distance;
                far_enough.then_some(reachable)
            })
        }
    }
}
