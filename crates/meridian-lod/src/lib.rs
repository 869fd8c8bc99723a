//! Level-of-detail policy: per-level view distances, distance-based LOD
//! selection, and chunk bounds on the ground plane.

mod bounds;
mod selector;

pub use bounds::Bounds2;
pub use selector::{DetailLevels, DetailLevelsError, LodInfo, LodSelector, SUPPORTED_LOD_COUNT};
