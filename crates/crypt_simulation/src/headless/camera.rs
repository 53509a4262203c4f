//! Перспективная камера для headless проекции world → viewport

use bevy::prelude::*;

use crate::collaborators::ViewportProjector;

/// Камера смотрит вдоль -Z своего transform (Bevy convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveViewport {
    pub transform: Transform,
    /// Вертикальный FOV в радианах
    pub fov_y: f32,
    /// width / height
    pub aspect: f32,
}

impl PerspectiveViewport {
    pub fn new(transform: Transform, fov_y: f32, aspect: f32) -> Self {
        Self { transform, fov_y, aspect }
    }

    /// Камера в `eye`, смотрит в `target`, 60° FOV, 16:9
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self::new(
            Transform::from_translation(eye).looking_at(target, Vec3::Y),
            60f32.to_radians(),
            16.0 / 9.0,
        )
    }
}

impl ViewportProjector for PerspectiveViewport {
    fn world_to_viewport(&self, point: Vec3) -> Vec3 {
        let local = self.transform.rotation.inverse() * (point - self.transform.translation);
        let depth = -local.z;
        if depth.abs() <= f32::EPSILON {
            // В плоскости камеры — вне экрана
            return Vec3::new(f32::NAN, f32::NAN, 0.0);
        }

        let half_height = (self.fov_y * 0.5).tan() * depth;
        let half_width = half_height * self.aspect;
        Vec3::new(
            local.x / half_width * 0.5 + 0.5,
            local.y / half_height * 0.5 + 0.5,
            depth,
        )
    }
}
