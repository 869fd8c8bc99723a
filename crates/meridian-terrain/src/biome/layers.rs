//! Named noise samples consulted by biome conditions.

use std::collections::BTreeMap;

use glam::Vec2;

use super::NoiseChannel;
use crate::noise_field::{NoiseField, NoiseParameters, NoiseSample};

/// A set of noise samples keyed by channel, all of the same dimensions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoiseLayers {
    layers: BTreeMap<NoiseChannel, NoiseSample>,
}

impl NoiseLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate one `size` x `size` sample per channel around `sample_center`.
    pub fn generate(
        size: usize,
        sample_center: Vec2,
        channels: &[(NoiseChannel, NoiseParameters)],
    ) -> Self {
        let mut layers = Self::new();
        for (channel, params) in channels {
            let sample = NoiseField::new(params.clone()).generate(size, size, sample_center);
            layers.insert(*channel, sample);
        }
        layers
    }

    /// Add or replace a channel.
    ///
    /// # Panics
    ///
    /// Panics if `sample` does not match the dimensions of existing layers.
    pub fn insert(&mut self, channel: NoiseChannel, sample: NoiseSample) {
        if let Some(dims) = self.dimensions() {
            assert_eq!(
                dims,
                sample.dimensions(),
                "noise layer {channel:?} does not match existing layer dimensions"
            );
        }
        self.layers.insert(channel, sample);
    }

    pub fn get(&self, channel: NoiseChannel) -> Option<&NoiseSample> {
        self.layers.get(&channel)
    }

    /// Value of `channel` at `(x, y)`, or `None` if the channel is absent.
    pub fn value(&self, channel: NoiseChannel, x: usize, y: usize) -> Option<f32> {
        self.layers.get(&channel).and_then(|s| s.get(x, y)).copied()
    }

    /// Shared `(width, height)` of the layers, or `None` when empty.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.layers.values().next().map(|s| s.dimensions())
    }

    pub fn channels(&self) -> impl Iterator<Item = NoiseChannel> + '_ {
        self.layers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_generate_builds_each_channel() {
        let temperature = NoiseParameters {
            seed: 1,
            ..Default::default()
        };
        let moisture = NoiseParameters {
            seed: 2,
            ..Default::default()
        };
        let layers = NoiseLayers::generate(
            8,
            Vec2::ZERO,
            &[
                (NoiseChannel::Temperature, temperature),
                (NoiseChannel::Moisture, moisture),
            ],
        );
        assert_eq!(layers.dimensions(), Some((8, 8)));
        assert!(layers.get(NoiseChannel::Temperature).is_some());
        assert!(layers.get(NoiseChannel::Elevation).is_none());
        assert_ne!(
            layers.get(NoiseChannel::Temperature),
            layers.get(NoiseChannel::Moisture)
        );
    }

    #[test]
    fn test_value_of_missing_channel_is_none() {
        let mut layers = NoiseLayers::new();
        layers.insert(NoiseChannel::Moisture, Grid::new(2, 2, 0.5));
        assert_eq!(layers.value(NoiseChannel::Moisture, 1, 1), Some(0.5));
        assert_eq!(layers.value(NoiseChannel::Temperature, 1, 1), None);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_mismatched_dimensions_panic() {
        let mut layers = NoiseLayers::new();
        layers.insert(NoiseChannel::Moisture, Grid::new(2, 2, 0.5));
        layers.insert(NoiseChannel::Temperature, Grid::new(3, 2, 0.5));
    }
}
