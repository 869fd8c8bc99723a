//! Keyframed response curves used to reshape normalized heights and falloff.

use serde::{Deserialize, Serialize};

/// A single `(time, value)` key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Errors from constructing a [`ResponseCurve`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("response curve needs at least one key")]
    Empty,
    #[error("curve key {index} is not finite")]
    NonFinite { index: usize },
    #[error("curve key times must be strictly increasing (key {index})")]
    NotIncreasing { index: usize },
}

/// Piecewise-linear curve through sorted keys.
///
/// Evaluation clamps to the first and last key outside their time range.
/// Curves are immutable after construction and can be shared freely across
/// worker threads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build a curve from keys with strictly increasing times.
    pub fn from_keys(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if index > 0 && key.time <= keys[index - 1].time {
                return Err(CurveError::NotIncreasing { index });
            }
        }
        Ok(Self { keys })
    }

    /// The identity curve over `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// Bake `f` over `[0, 1]` into `samples` evenly spaced keys (at least 2).
    pub fn from_fn(samples: usize, f: impl Fn(f32) -> f32) -> Self {
        let samples = samples.max(2);
        let last = (samples - 1) as f32;
        Self {
            keys: (0..samples)
                .map(|i| {
                    let t = i as f32 / last;
                    CurveKey::new(t, f(t))
                })
                .collect(),
        }
    }

    /// The island falloff response `v^a / (v^a + (b - b*v)^a)`.
    ///
    /// Stays near zero across the middle of the map and rises steeply towards
    /// the edge. `a = 3`, `b = 2.2` gives the usual island shape.
    pub fn island(a: f32, b: f32) -> Self {
        Self::from_fn(64, |v| {
            let num = v.powf(a);
            let den = num + (b - b * v).powf(a);
            if den > 0.0 { num / den } else { 0.0 }
        })
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let f = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * f
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl TryFrom<Vec<CurveKey>> for ResponseCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::from_keys(keys)
    }
}

impl From<ResponseCurve> for Vec<CurveKey> {
    fn from(curve: ResponseCurve) -> Self {
        curve.keys
    }
}
