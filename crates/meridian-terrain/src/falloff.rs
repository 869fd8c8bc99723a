//! Falloff masks that push terrain towards island shapes.
//!
//! A falloff field is subtracted from normalized heights so that the map
//! drops to sea level towards its edges.

use serde::{Deserialize, Serialize};

use crate::curve::ResponseCurve;
use crate::grid::Grid;

/// Distance metric used for the falloff mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FalloffShape {
    /// Chebyshev distance: square islands.
    #[default]
    Square,
    /// Euclidean distance clamped to 1: round islands.
    Radial,
}

/// Falloff mask generator.
pub struct FalloffField;

impl FalloffField {
    /// Generate a `size` x `size` mask with values in `[0, 1]`.
    ///
    /// Cells are mapped to `[-1, 1]` on both axes; the distance from the
    /// center in that space is passed through `curve`.
    pub fn generate(size: usize, shape: FalloffShape, curve: &ResponseCurve) -> Grid<f32> {
        let span = size.saturating_sub(1).max(1) as f32;
        Grid::from_fn(size, size, |x, y| {
            let u = x as f32 / span * 2.0 - 1.0;
            let v = y as f32 / span * 2.0 - 1.0;
            let distance = match shape {
                FalloffShape::Square => u.abs().max(v.abs()),
                FalloffShape::Radial => (u * u + v * v).sqrt().min(1.0),
            };
            curve.evaluate(distance).clamp(0.0, 1.0)
        })
    }
}
