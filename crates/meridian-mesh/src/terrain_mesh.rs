//! Height-map meshing with border-stitched normals.
//!
//! A height map carries one extra ring of samples around the visible chunk.
//! Those border samples become vertices that only contribute to normal
//! accumulation, so the edge normals of two neighbouring chunks are computed
//! from the same neighbourhood and the seam between them disappears.

use glam::{Vec2, Vec3};
use meridian_terrain::{HeightMap, HeightMapSettings, ResponseCurve};

use crate::settings::MeshSettings;

/// Grid stride for `lod`: 1 for LOD 0, otherwise `lod * 2`.
pub fn simplification_step(lod: u8) -> usize {
    if lod == 0 { 1 } else { usize::from(lod) * 2 }
}

/// Triangle mesh output. Every `Vec` except `indices` is per-vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Where a sampled grid point ended up.
#[derive(Clone, Copy, Debug)]
enum VertexRef {
    /// Emitted vertex, indexed in scan order.
    Main(usize),
    /// Border-ring vertex, used for normals only.
    Border(usize),
}

/// Converts height maps into meshes at a chosen level of detail.
#[derive(Clone, Debug)]
pub struct MeshBuilder {
    pub height_multiplier: f32,
    pub height_curve: ResponseCurve,
    pub mesh_scale: f32,
}

impl MeshBuilder {
    pub fn new(height_multiplier: f32, height_curve: ResponseCurve, mesh_scale: f32) -> Self {
        Self {
            height_multiplier,
            height_curve,
            mesh_scale,
        }
    }

    pub fn from_settings(height: &HeightMapSettings, mesh: &MeshSettings) -> Self {
        Self::new(
            height.height_multiplier,
            height.height_curve.clone(),
            mesh.mesh_scale,
        )
    }

    /// Build the mesh for `height_map` at `lod`.
    ///
    /// The bordered edge length minus one should be divisible by the
    /// simplification step so the last sampled line is the border ring.
    pub fn build(&self, height_map: &HeightMap, lod: u8) -> MeshData {
        let step = simplification_step(lod);
        let bordered = height_map.size();
        debug_assert!(
            bordered > 2 * step,
            "height map of size {bordered} is too small for LOD {lod}"
        );

        let mesh_size = bordered.saturating_sub(2 * step).max(1) as f32;
        let unsimplified = bordered.saturating_sub(2) as f32;
        let top_left = Vec2::new(-(unsimplified - 1.0) / 2.0, (unsimplified - 1.0) / 2.0);

        // Sampled grid points per line, border included.
        let lines = bordered.saturating_sub(1) / step + 1;

        let mut refs = Vec::with_capacity(lines * lines);
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        let mut border_positions = Vec::new();

        for j in 0..lines {
            let y = j * step;
            for i in 0..lines {
                let x = i * step;
                let percent = Vec2::new(
                    (x as f32 - step as f32) / mesh_size,
                    (y as f32 - step as f32) / mesh_size,
                );
                let height =
                    self.height_curve.evaluate(height_map.values[(x, y)]) * self.height_multiplier;
                let position = Vec3::new(
                    (top_left.x + percent.x * unsimplified) * self.mesh_scale,
                    height,
                    (top_left.y - percent.y * unsimplified) * self.mesh_scale,
                );

                let is_border = x == 0 || y == 0 || x == bordered - 1 || y == bordered - 1;
                if is_border {
                    refs.push(VertexRef::Border(border_positions.len()));
                    border_positions.push(position);
                } else {
                    refs.push(VertexRef::Main(positions.len()));
                    positions.push(position);
                    uvs.push(percent);
                }
            }
        }

        let point = |r: VertexRef| match r {
            VertexRef::Main(i) => positions[i],
            VertexRef::Border(i) => border_positions[i],
        };

        let mut indices = Vec::new();
        let mut accumulated = vec![Vec3::ZERO; positions.len()];

        for j in 0..lines.saturating_sub(1) {
            for i in 0..lines.saturating_sub(1) {
                let a = refs[j * lines + i];
                let b = refs[j * lines + i + 1];
                let c = refs[(j + 1) * lines + i];
                let d = refs[(j + 1) * lines + i + 1];

                for triangle in [[a, d, c], [d, a, b]] {
                    let [pa, pb, pc] = triangle.map(point);
                    // Left unnormalized so larger faces weigh more.
                    let face_normal = (pb - pa).cross(pc - pa);

                    for corner in triangle {
                        if let VertexRef::Main(index) = corner {
                            accumulated[index] += face_normal;
                        }
                    }

                    if let [VertexRef::Main(ia), VertexRef::Main(ib), VertexRef::Main(ic)] =
                        triangle
                    {
                        indices.extend([ia as u32, ib as u32, ic as u32]);
                    }
                }
            }
        }

        let normals = accumulated
            .into_iter()
            .map(Vec3::normalize_or_zero)
            .collect();

        tracing::trace!(
            lod,
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "built terrain mesh"
        );

        MeshData {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}
