//! Multi-octave fractal noise maps with local or global normalization.
//!
//! Composites octaves of 2D Perlin noise over a sample window. Octave offsets
//! are drawn from a seeded RNG, so the output is a pure function of the
//! parameters, the window size, and the sample center. Neighbouring chunks
//! that share parameters sample one continuous field.

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// A normalized noise map, indexed `[x, y]`.
pub type NoiseSample = Grid<f32>;

/// Range of the per-octave random offsets, `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Gradient lattice seed. Fixed so that the parameter seed only moves octave
/// offsets; the lattice itself never changes.
const LATTICE_SEED: u32 = 0;

/// How raw fractal values are remapped after accumulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Remap each sample from its own observed `[min, max]` to `[0, 1]`.
    /// Good for single previews; chunks will not line up.
    #[default]
    Local,
    /// Remap against the theoretical amplitude sum, identical for every
    /// chunk. Required for seamless streamed terrain.
    Global,
}

/// Parameters for a fractal noise map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Seed for the octave offset RNG.
    pub seed: i32,
    /// Number of octaves composited. At least 1 after validation.
    pub octaves: u32,
    /// Spatial scale of the first octave in grid cells. Larger values zoom in.
    pub scale: f32,
    /// Amplitude multiplier between successive octaves, in `[0, 1]`.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves, at least 1.
    pub lacunarity: f32,
    /// User offset added to the sample center.
    pub offset: Vec2,
    pub normalize_mode: NormalizeMode,
    /// Divisor applied in [`NormalizeMode::Global`] to pull heights back
    /// into range. Clamped to `[0.5, 2]`.
    pub height_offset: f32,
}

impl NoiseParameters {
    /// Smallest scale allowed after validation.
    pub const MIN_SCALE: f32 = 0.001;
    pub const MIN_HEIGHT_OFFSET: f32 = 0.5;
    pub const MAX_HEIGHT_OFFSET: f32 = 2.0;

    /// Clamp degenerate values to safe minimums.
    ///
    /// Generation assumes validated parameters and performs no guards of its
    /// own, so this must run wherever parameters enter the system.
    pub fn validate(&mut self) {
        self.scale = self.scale.max(Self::MIN_SCALE);
        self.octaves = self.octaves.max(1);
        self.lacunarity = self.lacunarity.max(1.0);
        self.persistence = self.persistence.clamp(0.0, 1.0);
        self.height_offset = self
            .height_offset
            .clamp(Self::MIN_HEIGHT_OFFSET, Self::MAX_HEIGHT_OFFSET);
    }

    /// Consuming variant of [`validate`](Self::validate).
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }

    /// Theoretical maximum of the raw octave sum: `sum(persistence^i)`.
    pub fn max_possible_height(&self) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            sum += amplitude;
            amplitude *= f64::from(self.persistence);
        }
        sum
    }
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            scale: 50.0,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Local,
            height_offset: 1.0,
        }
    }
}

/// Fractal noise generator bound to one parameter set.
pub struct NoiseField {
    perlin: Perlin,
    params: NoiseParameters,
}

impl NoiseField {
    /// Create a generator. `params` should already be validated.
    pub fn new(params: NoiseParameters) -> Self {
        Self {
            perlin: Perlin::new(LATTICE_SEED),
            params,
        }
    }

    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }

    /// Per-octave sample offsets for a window centered on `sample_center`.
    ///
    /// X offsets add the center, Y offsets subtract it. This matches the
    /// mesh layout where grid rows run towards negative world Z.
    fn octave_offsets(&self, sample_center: Vec2) -> Vec<DVec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(self.params.seed as u32));
        let center = self.params.offset + sample_center;
        (0..self.params.octaves)
            .map(|_| {
                let rx = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                let ry = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                DVec2::new(
                    f64::from(rx) + f64::from(center.x),
                    f64::from(ry) - f64::from(center.y),
                )
            })
            .collect()
    }

    /// Generate a `width` x `height` sample window centered on `sample_center`.
    pub fn generate(&self, width: usize, height: usize, sample_center: Vec2) -> NoiseSample {
        let params = &self.params;
        debug_assert!(
            params.scale > 0.0,
            "noise parameters must be validated before generation"
        );

        let offsets = self.octave_offsets(sample_center);
        let scale = f64::from(params.scale);
        let persistence = f64::from(params.persistence);
        let lacunarity = f64::from(params.lacunarity);
        let half_width = width as f64 / 2.0;
        let half_height = height as f64 / 2.0;

        let mut min_local = f64::MAX;
        let mut max_local = f64::MIN;

        let raw = Grid::from_fn(width, height, |x, y| {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut total = 0.0;

            for offset in &offsets {
                let sx = (x as f64 - half_width + offset.x) / scale * frequency;
                let sy = (y as f64 - half_height + offset.y) / scale * frequency;
                total += self.perlin.get([sx, sy]) * amplitude;

                amplitude *= persistence;
                frequency *= lacunarity;
            }

            min_local = min_local.min(total);
            max_local = max_local.max(total);
            total
        });

        match params.normalize_mode {
            NormalizeMode::Local => {
                let range = max_local - min_local;
                raw.map(|&v| {
                    if range > 0.0 {
                        ((v - min_local) / range) as f32
                    } else {
                        0.0
                    }
                })
            }
            NormalizeMode::Global => {
                let denominator =
                    2.0 * params.max_possible_height() * f64::from(params.height_offset);
                // Clamped below only; values may exceed 1.0.
                raw.map(|&v| ((v + 1.0) / denominator).max(0.0) as f32)
            }
        }
    }
}

/// Generate a noise map in one call.
pub fn generate_noise_map(
    width: usize,
    height: usize,
    params: &NoiseParameters,
    sample_center: Vec2,
) -> NoiseSample {
    NoiseField::new(params.clone()).generate(width, height, sample_center)
}
