//! Chunk dimensions shared by height-map generation, meshing, and streaming.

use serde::{Deserialize, Serialize};

pub use meridian_lod::SUPPORTED_LOD_COUNT;

/// Interior edge lengths a chunk may use. Each is divisible by every
/// simplification step, so all LODs land exactly on the chunk edge.
pub const SUPPORTED_CHUNK_SIZES: [usize; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Index into [`SUPPORTED_CHUNK_SIZES`].
    pub chunk_size_index: usize,
    /// World units per grid cell.
    pub mesh_scale: f32,
}

impl MeshSettings {
    pub const MIN_MESH_SCALE: f32 = 0.01;

    pub fn chunk_size(&self) -> usize {
        SUPPORTED_CHUNK_SIZES[self.chunk_size_index.min(SUPPORTED_CHUNK_SIZES.len() - 1)]
    }

    /// Vertices per line of a LOD 0 mesh, including the two border
    /// vertices that only feed normals. Also the height-map edge length.
    pub fn vertices_per_line(&self) -> usize {
        self.chunk_size() + 1
    }

    /// Edge length of one chunk in world units.
    pub fn world_size(&self) -> f32 {
        (self.vertices_per_line() - 3) as f32 * self.mesh_scale
    }

    pub fn validate(&mut self) {
        self.chunk_size_index = self.chunk_size_index.min(SUPPORTED_CHUNK_SIZES.len() - 1);
        self.mesh_scale = self.mesh_scale.max(Self::MIN_MESH_SCALE);
    }
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            chunk_size_index: SUPPORTED_CHUNK_SIZES.len() - 1,
            mesh_scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_largest_chunk() {
        let settings = MeshSettings::default();
        assert_eq!(settings.chunk_size(), 240);
        assert_eq!(settings.vertices_per_line(), 241);
        assert_eq!(settings.world_size(), 238.0);
    }

    #[test]
    fn test_world_size_scales() {
        let settings = MeshSettings {
            chunk_size_index: 0,
            mesh_scale: 2.5,
        };
        assert_eq!(settings.world_size(), 46.0 * 2.5);
    }

    #[test]
    fn test_every_size_divides_by_every_step() {
        for size in SUPPORTED_CHUNK_SIZES {
            for lod in 0..SUPPORTED_LOD_COUNT {
                let step = crate::simplification_step(lod);
                assert_eq!(size % step, 0, "size {size} lod {lod}");
            }
        }
    }

    #[test]
    fn test_validate_clamps() {
        let mut settings = MeshSettings {
            chunk_size_index: 40,
            mesh_scale: -1.0,
        };
        settings.validate();
        assert_eq!(settings.chunk_size_index, 8);
        assert_eq!(settings.mesh_scale, MeshSettings::MIN_MESH_SCALE);
    }
}
