//! Per-chunk streaming state.

use std::sync::Arc;

use glam::Vec2;
use meridian_lod::{Bounds2, LodInfo};
use meridian_mesh::MeshData;
use meridian_terrain::HeightMap;

use crate::coord::ChunkCoord;

/// Where a chunk is in its generation pipeline, seen from one LOD slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Unloaded,
    HeightPending,
    HeightReady,
    MeshPending,
    MeshReady,
}

/// Mesh for one detail level. Requested at most once.
#[derive(Clone, Debug)]
pub struct LodMeshSlot {
    /// Simplification level this slot meshes at.
    pub lod: u8,
    /// Set once the mesh job is submitted; never cleared.
    pub requested: bool,
    /// Finished mesh, filled by the first successful completion.
    pub mesh: Option<Arc<MeshData>>,
}

impl LodMeshSlot {
    /// An empty, unrequested slot for `lod`.
    pub fn new(lod: u8) -> Self {
        Self {
            lod,
            requested: false,
            mesh: None,
        }
    }

    /// Whether the mesh has arrived.
    pub fn is_ready(&self) -> bool {
        self.mesh.is_some()
    }
}

/// One square of terrain tracked by the streamer.
///
/// Chunks are created when they first enter the view window and are never
/// destroyed, only hidden.
#[derive(Clone, Debug)]
pub struct TerrainChunk {
    /// Registry key of this chunk.
    pub coord: ChunkCoord,
    /// World-space footprint, used for edge distances.
    pub bounds: Bounds2,
    /// Noise-space center of the height map.
    pub sample_center: Vec2,
    /// One slot per configured detail level, in the same order.
    pub slots: Vec<LodMeshSlot>,
    /// Set once the height job is submitted; never cleared.
    pub height_requested: bool,
    /// Bordered height map shared by every mesh job of this chunk.
    pub height_map: Option<Arc<HeightMap>>,
    /// Whether the chunk is inside the view distance.
    pub visible: bool,
    /// Slot whose mesh is currently displayed.
    pub displayed_lod: Option<usize>,
    /// Set once the collider mesh has been committed.
    pub collider_set: bool,
}

impl TerrainChunk {
    /// A chunk with no data yet, one empty slot per entry in `levels`.
    pub fn new(coord: ChunkCoord, world_size: f32, mesh_scale: f32, levels: &[LodInfo]) -> Self {
        Self {
            coord,
            bounds: Bounds2::square(coord.world_center(world_size), world_size),
            sample_center: coord.sample_center(world_size, mesh_scale),
            slots: levels.iter().map(|l| LodMeshSlot::new(l.lod)).collect(),
            height_requested: false,
            height_map: None,
            visible: false,
            displayed_lod: None,
            collider_set: false,
        }
    }

    /// Whether the height map has arrived.
    pub fn has_height_map(&self) -> bool {
        self.height_map.is_some()
    }

    /// Pipeline state as seen from slot `lod_index`.
    pub fn state(&self, lod_index: usize) -> ChunkState {
        if !self.height_requested {
            return ChunkState::Unloaded;
        }
        if self.height_map.is_none() {
            return ChunkState::HeightPending;
        }
        match self.slots.get(lod_index) {
            Some(slot) if slot.is_ready() => ChunkState::MeshReady,
            Some(slot) if slot.requested => ChunkState::MeshPending,
            _ => ChunkState::HeightReady,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_terrain::Grid;

    fn levels() -> Vec<LodInfo> {
        vec![LodInfo::new(0, 100.0), LodInfo::new(2, 200.0)]
    }

    #[test]
    fn test_new_chunk_geometry() {
        let chunk = TerrainChunk::new(ChunkCoord::new(1, -1), 50.0, 2.0, &levels());
        assert_eq!(chunk.bounds.center, Vec2::new(50.0, -50.0));
        assert_eq!(chunk.bounds.size, Vec2::splat(50.0));
        assert_eq!(chunk.sample_center, Vec2::new(25.0, -25.0));
        assert_eq!(chunk.slots.len(), 2);
        assert_eq!(chunk.slots[1].lod, 2);
        assert!(!chunk.visible);
    }

    #[test]
    fn test_state_progression() {
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 50.0, 1.0, &levels());
        assert_eq!(chunk.state(0), ChunkState::Unloaded);

        chunk.height_requested = true;
        assert_eq!(chunk.state(0), ChunkState::HeightPending);

        chunk.height_map = Some(Arc::new(HeightMap::new(Grid::new(5, 5, 0.0))));
        assert_eq!(chunk.state(0), ChunkState::HeightReady);

        chunk.slots[0].requested = true;
        assert_eq!(chunk.state(0), ChunkState::MeshPending);
        assert_eq!(chunk.state(1), ChunkState::HeightReady);

        chunk.slots[0].mesh = Some(Arc::new(MeshData::default()));
        assert_eq!(chunk.state(0), ChunkState::MeshReady);
    }
}
