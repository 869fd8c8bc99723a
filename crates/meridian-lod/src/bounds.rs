//! Axis-aligned bounds on the ground plane.

use glam::Vec2;

/// An axis-aligned rectangle given by its center and full size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub center: Vec2,
    pub size: Vec2,
}

impl Bounds2 {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// A square of edge length `size` around `center`.
    pub fn square(center: Vec2, size: f32) -> Self {
        Self::new(center, Vec2::splat(size))
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min()).all() && point.cmple(self.max()).all()
    }

    /// Squared distance from `point` to the nearest point of the bounds.
    /// Zero inside.
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let nearest = point.clamp(self.min(), self.max());
        point.distance_squared(nearest)
    }

    /// Distance from `point` to the nearest edge. Zero inside.
    pub fn distance(&self, point: Vec2) -> f32 {
        self.sqr_distance(point).sqrt()
    }
}
