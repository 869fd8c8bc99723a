//! Biome system: definitions, noise layers, and grid classification.
//!
//! Cells are assigned the first definition whose every condition matches the
//! sampled noise channels, then boundaries between configured biome pairs are
//! smoothed by transition rules.

mod classifier;
mod def;
mod layers;

pub use classifier::BiomeClassifier;
pub use def::{
    BiomeCondition, BiomeDefinition, BiomeMap, BiomeType, NoiseChannel, Rgba, TransitionRule,
};
pub use layers::NoiseLayers;
