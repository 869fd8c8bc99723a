//! Terrain meshing: bordered height grids to seam-correct triangle meshes,
//! the supported chunk-size table, and packed vertices for GPU upload.

pub mod packed;
pub mod settings;
pub mod terrain_mesh;

pub use packed::{PackedTerrainMesh, TerrainVertex};
pub use settings::{MeshSettings, SUPPORTED_CHUNK_SIZES, SUPPORTED_LOD_COUNT};
pub use terrain_mesh::{MeshBuilder, MeshData, simplification_step};
