//! Кинематический navmesh agent: движение по прямой внутри walkable диска

use bevy::prelude::*;

use crate::collaborators::Navigator;

/// Walkable область агента (упрощённый navmesh: диск на плоскости XZ)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkableArea {
    pub center: Vec3,
    pub radius: f32,
}

impl WalkableArea {
    pub fn contains(&self, point: Vec3) -> bool {
        horizontal(point - self.center).length() <= self.radius
    }

    /// Ближайшая к `point` точка области (y сохраняется)
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let offset = horizontal(point - self.center);
        if offset.length() <= self.radius {
            return point;
        }
        let edge = self.center + offset.normalize_or_zero() * self.radius;
        Vec3::new(edge.x, point.y, edge.z)
    }
}

#[derive(Debug, Clone)]
pub struct KinematicNavigator {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    pub speed: f32,
    pub stopping_distance: f32,
    stopped: bool,
    enabled: bool,
    walkable: Option<WalkableArea>,
}

impl KinematicNavigator {
    pub fn new(speed: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            destination: None,
            velocity: Vec3::ZERO,
            speed,
            stopping_distance: 0.5,
            stopped: false,
            enabled: true,
            walkable: None,
        }
    }

    pub fn with_walkable_area(mut self, center: Vec3, radius: f32) -> Self {
        self.walkable = Some(WalkableArea { center, radius });
        self
    }

    pub fn with_stopping_distance(mut self, stopping_distance: f32) -> Self {
        self.stopping_distance = stopping_distance;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

impl Navigator for KinematicNavigator {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn is_path_complete(&self) -> bool {
        match (self.destination, self.walkable) {
            (Some(destination), Some(area)) => area.contains(destination),
            _ => true,
        }
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map(|d| horizontal(d - self.position).length())
            .unwrap_or(0.0)
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let Some(area) = self.walkable else {
            return Some(point);
        };
        let snapped = area.clamp(point);
        (snapped.distance(point) <= max_distance).then_some(snapped)
    }

    fn advance(&mut self, position: Vec3, dt: f32) -> Vec3 {
        self.position = position;

        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return position;
        };
        if !self.enabled || self.stopped || dt <= 0.0 {
            self.velocity = Vec3::ZERO;
            return position;
        }

        // Частичный путь: идём к ближайшей достижимой точке
        let target = match self.walkable {
            Some(area) => area.clamp(destination),
            None => destination,
        };
        let to_target = horizontal(target - position);
        let remaining = to_target.length();
        if remaining <= self.stopping_distance {
            self.velocity = Vec3::ZERO;
            return position;
        }

        let step = (self.speed * dt).min(remaining);
        let moved = to_target / remaining * step;
        self.velocity = moved / dt;
        self.position = position + moved;
        self.position
    }
}

fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
