//! Distance-based LOD selection over configured detail levels.

use serde::{Deserialize, Serialize};

/// Number of LOD tiers a mesh can be simplified to.
pub const SUPPORTED_LOD_COUNT: u8 = 5;

/// One detail level: the mesh LOD to show and how far it stays in use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodInfo {
    /// Mesh simplification level, `0..SUPPORTED_LOD_COUNT`.
    pub lod: u8,
    /// Largest edge distance at which this level is selected.
    pub visible_distance: f32,
}

impl LodInfo {
    /// Create a detail level showing `lod` up to `visible_distance`.
    pub fn new(lod: u8, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }

    /// Squared visible distance, for comparing against squared edge distances.
    pub fn sqr_visible_distance(&self) -> f32 {
        self.visible_distance * self.visible_distance
    }
}

/// Errors from [`DetailLevels::new`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetailLevelsError {
    #[error("at least one detail level is required")]
    Empty,
    #[error("detail level {index} uses LOD {lod}, supported range is 0..{SUPPORTED_LOD_COUNT}")]
    UnsupportedLod { index: usize, lod: u8 },
    #[error("detail level {index} has invalid distance {distance}")]
    InvalidDistance { index: usize, distance: f32 },
    #[error("detail level distances must be strictly increasing (level {index})")]
    NotAscending { index: usize },
    #[error("collider index {index} is out of range for {count} detail levels")]
    ColliderOutOfRange { index: usize, count: usize },
}

/// Ascending detail levels plus the level whose mesh becomes the collider.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailLevels {
    levels: Vec<LodInfo>,
    collider_index: usize,
}

impl DetailLevels {
    /// Validate `levels` and the collider slot.
    ///
    /// Levels must be non-empty, use supported LODs, and have finite,
    /// non-negative, strictly increasing distances.
    pub fn new(levels: Vec<LodInfo>, collider_index: usize) -> Result<Self, DetailLevelsError> {
        if levels.is_empty() {
            return Err(DetailLevelsError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            if level.lod >= SUPPORTED_LOD_COUNT {
                return Err(DetailLevelsError::UnsupportedLod {
                    index,
                    lod: level.lod,
                });
            }
            if !level.visible_distance.is_finite() || level.visible_distance < 0.0 {
                return Err(DetailLevelsError::InvalidDistance {
                    index,
                    distance: level.visible_distance,
                });
            }
            if index > 0 && level.visible_distance <= levels[index - 1].visible_distance {
                return Err(DetailLevelsError::NotAscending { index });
            }
        }
        if collider_index >= levels.len() {
            return Err(DetailLevelsError::ColliderOutOfRange {
                index: collider_index,
                count: levels.len(),
            });
        }
        Ok(Self {
            levels,
            collider_index,
        })
    }

    /// Return the levels in ascending distance order.
    pub fn levels(&self) -> &[LodInfo] {
        &self.levels
    }

    /// Return the number of detail levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always `false` for a validated set.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Return the level at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&LodInfo> {
        self.levels.get(index)
    }

    /// Return the index of the level whose mesh becomes the collider.
    pub fn collider_index(&self) -> usize {
        self.collider_index
    }

    /// Return the collider level.
    pub fn collider(&self) -> &LodInfo {
        &self.levels[self.collider_index]
    }

    /// The last threshold: nothing farther than this is shown.
    pub fn max_view_distance(&self) -> f32 {
        self.levels[self.levels.len() - 1].visible_distance
    }
}

impl Default for DetailLevels {
    fn default() -> Self {
        Self {
            levels: vec![
                LodInfo::new(0, 200.0),
                LodInfo::new(1, 400.0),
                LodInfo::new(4, 600.0),
            ],
            collider_index: 0,
        }
    }
}

/// Selects a detail level from the distance between the viewer and a
/// chunk's nearest edge.
#[derive(Clone, Debug)]
pub struct LodSelector {
    levels: DetailLevels,
}

impl LodSelector {
    /// Create a new LOD selector over validated detail levels.
    pub fn new(levels: DetailLevels) -> Self {
        Self { levels }
    }

    /// Index of the first level whose distance covers `edge_distance`, or
    /// the last level if none does.
    pub fn select(&self, edge_distance: f32) -> usize {
        let levels = self.levels.levels();
        levels
            .iter()
            .position(|l| edge_distance <= l.visible_distance)
            .unwrap_or(levels.len() - 1)
    }

    /// Whether a chunk at `edge_distance` should be shown at all.
    pub fn is_visible(&self, edge_distance: f32) -> bool {
        edge_distance <= self.levels.max_view_distance()
    }

    /// Return the farthest distance at which any level is shown.
    pub fn max_view_distance(&self) -> f32 {
        self.levels.max_view_distance()
    }

    /// Return a reference to the detail levels.
    pub fn levels(&self) -> &DetailLevels {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_levels() -> LodSelector {
        LodSelector::new(
            DetailLevels::new(vec![LodInfo::new(0, 300.0), LodInfo::new(1, 400.0)], 0).unwrap(),
        )
    }

    #[test]
    fn test_two_level_scenario() {
        let selector = two_levels();
        assert_eq!(selector.select(250.0), 0);
        assert!(selector.is_visible(250.0));
        assert_eq!(selector.select(350.0), 1);
        assert!(selector.is_visible(350.0));
        assert!(!selector.is_visible(500.0));
        assert_eq!(selector.select(500.0), 1);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let selector = two_levels();
        assert_eq!(selector.select(300.0), 0);
        assert_eq!(selector.select(300.001), 1);
        assert!(selector.is_visible(400.0));
    }

    #[test]
    fn test_zero_distance_returns_first_level() {
        assert_eq!(two_levels().select(0.0), 0);
    }

    #[test]
    fn test_rejects_non_ascending() {
        let err = DetailLevels::new(vec![LodInfo::new(0, 300.0), LodInfo::new(1, 300.0)], 0)
            .unwrap_err();
        assert_eq!(err, DetailLevelsError::NotAscending { index: 1 });
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(DetailLevels::new(vec![], 0), Err(DetailLevelsError::Empty));
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(5, 100.0)], 0),
            Err(DetailLevelsError::UnsupportedLod { index: 0, lod: 5 })
        );
        assert_eq!(
            DetailLevels::new(vec![LodInfo::new(0, 100.0)], 1),
            Err(DetailLevelsError::ColliderOutOfRange { index: 1, count: 1 })
        );
        assert!(matches!(
            DetailLevels::new(vec![LodInfo::new(0, f32::NAN)], 0),
            Err(DetailLevelsError::InvalidDistance { index: 0, .. })
        ));
    }

    #[test]
    fn test_default_levels_are_valid() {
        let levels = DetailLevels::default();
        let rebuilt = DetailLevels::new(levels.levels().to_vec(), levels.collider_index());
        assert_eq!(rebuilt, Ok(levels));
    }

    proptest! {
        #[test]
        fn prop_selection_is_monotonic(mut a in 0.0f32..2000.0, mut b in 0.0f32..2000.0) {
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            let selector = LodSelector::new(DetailLevels::new(
                vec![
                    LodInfo::new(0, 100.0),
                    LodInfo::new(1, 250.0),
                    LodInfo::new(2, 600.0),
                    LodInfo::new(4, 1200.0),
                ],
                1,
            ).unwrap());
            prop_assert!(selector.select(a) <= selector.select(b));
        }
    }
}
