//! Integer chunk coordinates on the ground plane.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Chunk grid coordinate. Chunk `(x, y)` is centered on
/// `(x, y) * world_size` in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk whose center is nearest to `position`.
    pub fn from_world(position: Vec2, world_size: f32) -> Self {
        let c = (position / world_size).round();
        Self::new(c.x as i32, c.y as i32)
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn world_center(self, world_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * world_size
    }

    /// Noise-space center for this chunk's height map.
    pub fn sample_center(self, world_size: f32, mesh_scale: f32) -> Vec2 {
        self.world_center(world_size) / mesh_scale
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
