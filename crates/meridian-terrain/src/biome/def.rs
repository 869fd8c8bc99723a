//! Biome definitions, transition rules, and the classified map.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// A named noise input consulted by biome conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoiseChannel {
    Temperature,
    Moisture,
    Elevation,
}

/// Biome categories known to the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeType {
    Desert,
    Forest,
    Snow,
    Grassland,
    Mountains,
}

/// An 8-bit RGBA color. The default is transparent black.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
}

/// Inclusive range check on one noise channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeCondition {
    pub channel: NoiseChannel,
    pub min: f32,
    pub max: f32,
}

impl BiomeCondition {
    pub fn new(channel: NoiseChannel, min: f32, max: f32) -> Self {
        Self { channel, min, max }
    }

    #[inline]
    pub fn matches(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Full descriptor for a biome. Definitions are matched in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeDefinition {
    /// Human-readable biome name (e.g., "temperate_forest").
    pub name: String,
    pub biome_type: BiomeType,
    pub color: Rgba,
    /// Every condition must hold for a cell to belong to this biome.
    #[serde(default)]
    pub conditions: Vec<BiomeCondition>,
}

/// Softens the boundary between `source` and `target` by recoloring
/// `source` cells within `radius` of the contact to `replacement`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub source: BiomeType,
    pub target: BiomeType,
    pub replacement: BiomeType,
    /// Euclidean radius in cells.
    pub radius: u32,
}

/// Per-cell biome assignment and display color.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeMap {
    pub biomes: Grid<Option<BiomeType>>,
    pub colors: Grid<Rgba>,
}

impl BiomeMap {
    /// An unassigned map with every cell transparent.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            biomes: Grid::new(width, height, None),
            colors: Grid::new(width, height, Rgba::TRANSPARENT),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.biomes.dimensions()
    }

    pub fn biome(&self, x: usize, y: usize) -> Option<BiomeType> {
        self.biomes.get(x, y).copied().flatten()
    }

    pub fn color(&self, x: usize, y: usize) -> Option<Rgba> {
        self.colors.get(x, y).copied()
    }

    /// Assign a biome and its color to one cell.
    pub fn set(&mut self, x: usize, y: usize, biome: BiomeType, color: Rgba) {
        self.biomes[(x, y)] = Some(biome);
        self.colors[(x, y)] = color;
    }

    /// Number of cells assigned `biome`.
    pub fn count(&self, biome: BiomeType) -> usize {
        self.biomes
            .cells()
            .iter()
            .filter(|b| **b == Some(biome))
            .count()
    }
}
