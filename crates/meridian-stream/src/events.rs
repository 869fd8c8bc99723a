use std::sync::Arc;

use meridian_mesh::MeshData;

use crate::coord::ChunkCoord;

/// Changes the host should apply to its scene, emitted in order by
/// [`ChunkStreamer::update`](crate::ChunkStreamer::update).
#[derive(Clone, Debug)]
pub enum StreamEvent {
    /// A chunk was shown or hidden.
    VisibilityChanged { coord: ChunkCoord, visible: bool },
    /// A chunk now displays the mesh of detail level `lod_index`.
    MeshChanged {
        coord: ChunkCoord,
        lod_index: usize,
        lod: u8,
        mesh: Arc<MeshData>,
    },
    /// A chunk's collision mesh was set. Emitted at most once per chunk.
    ColliderCommitted {
        coord: ChunkCoord,
        lod: u8,
        mesh: Arc<MeshData>,
    },
}

impl StreamEvent {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            StreamEvent::VisibilityChanged { coord, .. }
            | StreamEvent::MeshChanged { coord, .. }
            | StreamEvent::ColliderCommitted { coord, .. } => *coord,
        }
    }
}
