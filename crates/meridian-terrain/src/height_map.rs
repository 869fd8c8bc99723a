//! Bordered height maps built from a noise field and an optional falloff mask.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::curve::ResponseCurve;
use crate::falloff::{FalloffField, FalloffShape};
use crate::grid::Grid;
use crate::noise_field::{NoiseField, NoiseParameters};

/// Normalized heights for one chunk, including the one-cell border ring.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    pub values: Grid<f32>,
    pub min_value: f32,
    pub max_value: f32,
}

impl HeightMap {
    /// Wrap a grid of heights, recording its observed range.
    pub fn new(values: Grid<f32>) -> Self {
        let (min_value, max_value) = values
            .cells()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Self {
            values,
            min_value,
            max_value,
        }
    }

    /// Side length of the bordered grid.
    pub fn size(&self) -> usize {
        self.values.width()
    }

    /// Side length without the border ring.
    pub fn interior_size(&self) -> usize {
        self.size().saturating_sub(2)
    }
}

/// How normalized noise becomes terrain height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapSettings {
    pub noise: NoiseParameters,
    /// World-space height of a normalized value of 1 after the curve.
    pub height_multiplier: f32,
    pub height_curve: ResponseCurve,
    pub use_falloff: bool,
    pub falloff_shape: FalloffShape,
    pub falloff_curve: ResponseCurve,
}

impl HeightMapSettings {
    /// Lowest world height the mesh can reach.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// Highest world height the mesh can reach.
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }

    pub fn validate(&mut self) {
        self.noise.validate();
        if !self.height_multiplier.is_finite() {
            self.height_multiplier = Self::default().height_multiplier;
        }
    }
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseParameters::default(),
            height_multiplier: 30.0,
            height_curve: ResponseCurve::linear(),
            use_falloff: false,
            falloff_shape: FalloffShape::Square,
            falloff_curve: ResponseCurve::island(3.0, 2.2),
        }
    }
}

/// Builds height maps for arbitrary chunk centers. Shared between worker
/// threads behind an `Arc`.
pub struct HeightMapBuilder {
    field: NoiseField,
    settings: HeightMapSettings,
    falloff_cache: Mutex<HashMap<usize, Arc<Grid<f32>>>>,
}

impl HeightMapBuilder {
    pub fn new(settings: HeightMapSettings) -> Self {
        Self {
            field: NoiseField::new(settings.noise.clone()),
            settings,
            falloff_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &HeightMapSettings {
        &self.settings
    }

    /// Falloff mask for `size`, generated on first use.
    pub fn falloff(&self, size: usize) -> Arc<Grid<f32>> {
        let mut cache = self
            .falloff_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(size)
            .or_insert_with(|| {
                tracing::debug!(size, "generating falloff mask");
                Arc::new(FalloffField::generate(
                    size,
                    self.settings.falloff_shape,
                    &self.settings.falloff_curve,
                ))
            })
            .clone()
    }

    /// Build a `size` x `size` height map centered on `sample_center`.
    pub fn build(&self, size: usize, sample_center: Vec2) -> HeightMap {
        let mut values = self.field.generate(size, size, sample_center);

        if self.settings.use_falloff {
            let falloff = self.falloff(size);
            for (value, &mask) in values.cells_mut().iter_mut().zip(falloff.cells()) {
                *value = (*value - mask).clamp(0.0, 1.0);
            }
        }

        HeightMap::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NormalizeMode;

    fn settings(use_falloff: bool) -> HeightMapSettings {
        HeightMapSettings {
            noise: NoiseParameters {
                seed: 3,
                octaves: 4,
                scale: 30.0,
                normalize_mode: NormalizeMode::Global,
                ..Default::default()
            },
            use_falloff,
            ..Default::default()
        }
    }

    #[test]
    fn test_min_max_match_values() {
        let map = HeightMapBuilder::new(settings(false)).build(20, Vec2::new(5.0, 9.0));
        let min = map.values.cells().iter().copied().fold(f32::MAX, f32::min);
        let max = map.values.cells().iter().copied().fold(f32::MIN, f32::max);
        assert_eq!(map.min_value, min);
        assert_eq!(map.max_value, max);
        assert_eq!(map.size(), 20);
        assert_eq!(map.interior_size(), 18);
    }

    #[test]
    fn test_falloff_keeps_unit_range_and_sinks_edges() {
        let builder = HeightMapBuilder::new(settings(true));
        let map = builder.build(41, Vec2::ZERO);
        assert!(map.values.cells().iter().all(|&v| (0.0..=1.0).contains(&v)));
        for i in 0..41 {
            assert_eq!(map.values[(0, i)], 0.0);
            assert_eq!(map.values[(40, i)], 0.0);
        }
    }

    #[test]
    fn test_falloff_mask_is_cached_per_size() {
        let builder = HeightMapBuilder::new(settings(true));
        let a = builder.falloff(16);
        let b = builder.falloff(16);
        let c = builder.falloff(24);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(c.width(), 24);
    }

    #[test]
    fn test_height_range_from_curve() {
        let settings = HeightMapSettings {
            height_multiplier: 12.0,
            ..Default::default()
        };
        assert_eq!(settings.min_height(), 0.0);
        assert_eq!(settings.max_height(), 12.0);
    }
}
