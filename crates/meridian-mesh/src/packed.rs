//! Interleaved vertex buffers ready for GPU upload.

use crate::terrain_mesh::MeshData;

/// A single terrain vertex, 32 bytes, interleaved for upload.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`
///   - `[24..32]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

/// A packed terrain mesh: interleaved vertices plus the index buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedTerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl PackedTerrainMesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the size of the vertex buffer in bytes.
    pub fn vertex_buffer_bytes(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<TerrainVertex>()
    }

    /// Returns the size of the index buffer in bytes.
    pub fn index_buffer_bytes(&self) -> usize {
        self.indices.len() * std::mem::size_of::<u32>()
    }

    /// Returns the vertex data as a byte slice for GPU upload (zero-copy).
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the index data as a byte slice for GPU upload (zero-copy).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl MeshData {
    /// Interleave positions, normals, and UVs.
    pub fn pack(&self) -> PackedTerrainMesh {
        let vertices = self
            .positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| TerrainVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect();
        PackedTerrainMesh {
            vertices,
            indices: self.indices.clone(),
        }
    }
}
