//! "Целиком в кадре" проверка для ranged врагов

use bevy::prelude::*;

use crate::collaborators::ViewportProjector;

/// Bounding box рендера актора (центр относительно Transform + half extents)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct VisibilityBounds {
    pub center_offset: Vec3,
    pub half_extents: Vec3,
}

impl Default for VisibilityBounds {
    fn default() -> Self {
        // Гуманоид ~2м ростом
        Self {
            center_offset: Vec3::new(0.0, 1.0, 0.0),
            half_extents: Vec3::new(0.5, 1.0, 0.5),
        }
    }
}

impl VisibilityBounds {
    pub fn corners(&self, position: Vec3) -> [Vec3; 8] {
        let c = position + self.center_offset;
        let e = self.half_extents;
        [
            c + Vec3::new(e.x, e.y, e.z),
            c + Vec3::new(e.x, e.y, -e.z),
            c + Vec3::new(e.x, -e.y, e.z),
            c + Vec3::new(e.x, -e.y, -e.z),
            c + Vec3::new(-e.x, e.y, e.z),
            c + Vec3::new(-e.x, e.y, -e.z),
            c + Vec3::new(-e.x, -e.y, e.z),
            c + Vec3::new(-e.x, -e.y, -e.z),
        ]
    }
}

/// Все 8 углов в [0,1]² viewport и перед камерой (depth > 0)
pub fn is_fully_visible(camera: &dyn ViewportProjector, bounds: &VisibilityBounds, position: Vec3) -> bool {
    bounds.corners(position).iter().all(|&corner| {
        let viewport = camera.world_to_viewport(corner);
        viewport.z > 0.0
            && (0.0..=1.0).contains(&viewport.x)
            && (0.0..=1.0).contains(&viewport.y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::PerspectiveViewport;

    fn camera() -> PerspectiveViewport {
        PerspectiveViewport::looking_at(Vec3::new(0.0, 1.0, 15.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_centered_actor_is_visible() {
        assert!(is_fully_visible(&camera(), &VisibilityBounds::default(), Vec3::ZERO));
    }

    #[test]
    fn test_partially_offscreen_actor_is_not_visible() {
        // Половина бокса за левым краем кадра
        let half_width = (30f32.to_radians()).tan() * 15.0 * 16.0 / 9.0;
        let position = Vec3::new(-half_width, 0.0, 0.0);
        assert!(!is_fully_visible(&camera(), &VisibilityBounds::default(), position));
    }

    #[test]
    fn test_actor_behind_camera_is_not_visible() {
        assert!(!is_fully_visible(&camera(), &VisibilityBounds::default(), Vec3::new(0.0, 0.0, 30.0)));
    }

    #[test]
    fn test_actor_straddling_camera_plane_is_not_visible() {
        // Бокс пересекает плоскость камеры: часть углов с depth ≤ 0
        assert!(!is_fully_visible(&camera(), &VisibilityBounds::default(), Vec3::new(0.0, 0.0, 15.0)));
    }
}
