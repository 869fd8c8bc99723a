//! Procedural terrain fields: fractal noise maps, falloff masks, height maps,
//! and biome classification over a shared 2D grid.

mod curve;
mod falloff;
mod grid;
mod height_map;
mod noise_field;

pub mod biome;
pub mod debug_viz;

pub use biome::{
    BiomeClassifier, BiomeCondition, BiomeDefinition, BiomeMap, BiomeType, NoiseChannel,
    NoiseLayers, Rgba, TransitionRule,
};
pub use curve::{CurveError, CurveKey, ResponseCurve};
pub use falloff::{FalloffField, FalloffShape};
pub use grid::Grid;
pub use height_map::{HeightMap, HeightMapBuilder, HeightMapSettings};
pub use noise_field::{NoiseField, NoiseParameters, NoiseSample, NormalizeMode, generate_noise_map};
