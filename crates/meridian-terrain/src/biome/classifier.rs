//! Biome assignment and transition smoothing.

use super::{BiomeDefinition, BiomeMap, NoiseLayers, TransitionRule};

/// Classifies noise layers into a [`BiomeMap`].
#[derive(Clone, Copy, Debug)]
pub struct BiomeClassifier {
    adjacency_radius: u32,
}

impl BiomeClassifier {
    /// Chebyshev radius used to detect contact with a rule's target biome.
    pub const DEFAULT_ADJACENCY_RADIUS: u32 = 1;

    pub fn new() -> Self {
        Self {
            adjacency_radius: Self::DEFAULT_ADJACENCY_RADIUS,
        }
    }

    pub fn with_adjacency_radius(adjacency_radius: u32) -> Self {
        Self { adjacency_radius }
    }

    pub fn adjacency_radius(&self) -> u32 {
        self.adjacency_radius
    }

    /// Assign biomes, then smooth their boundaries with `rules`.
    pub fn classify(
        &self,
        layers: &NoiseLayers,
        definitions: &[BiomeDefinition],
        rules: &[TransitionRule],
    ) -> BiomeMap {
        let mut map = self.assign(layers, definitions);
        self.apply_transitions(&mut map, definitions, rules);
        map
    }

    /// First pass: the first definition whose conditions all hold wins.
    ///
    /// A condition on a channel missing from `layers` is skipped. Cells that
    /// match nothing stay empty and transparent.
    pub fn assign(&self, layers: &NoiseLayers, definitions: &[BiomeDefinition]) -> BiomeMap {
        let (width, height) = layers.dimensions().unwrap_or((0, 0));
        let mut map = BiomeMap::empty(width, height);

        for y in 0..height {
            for x in 0..width {
                let found = definitions.iter().find(|def| {
                    def.conditions.iter().all(|cond| {
                        layers
                            .value(cond.channel, x, y)
                            .is_none_or(|v| cond.matches(v))
                    })
                });
                if let Some(def) = found {
                    map.set(x, y, def.biome_type, def.color);
                }
            }
        }

        tracing::trace!(width, height, "assigned biomes");
        map
    }

    /// Second pass: recolor `source` cells near a `target` contact.
    ///
    /// Every change is computed against a snapshot of `map` and then applied
    /// in scan order, so the result does not depend on earlier changes in
    /// the same pass.
    pub fn apply_transitions(
        &self,
        map: &mut BiomeMap,
        definitions: &[BiomeDefinition],
        rules: &[TransitionRule],
    ) {
        if rules.is_empty() {
            return;
        }

        let snapshot = map.biomes.clone();
        let mut changes = Vec::new();

        for (x, y, biome) in snapshot.iter() {
            let Some(biome) = *biome else { continue };

            for rule in rules.iter().filter(|r| r.source == biome) {
                let Some(replacement) = definitions
                    .iter()
                    .find(|d| d.biome_type == rule.replacement)
                else {
                    continue;
                };

                let touches_target = snapshot
                    .window(x, y, self.adjacency_radius)
                    .any(|(nx, ny, _, _)| snapshot[(nx, ny)] == Some(rule.target));
                if !touches_target {
                    continue;
                }

                let r2 = i64::from(rule.radius) * i64::from(rule.radius);
                for (nx, ny, dx, dy) in snapshot.window(x, y, rule.radius) {
                    if dx * dx + dy * dy <= r2 && snapshot[(nx, ny)] == Some(rule.source) {
                        changes.push((nx, ny, replacement.biome_type, replacement.color));
                    }
                }
            }
        }

        if !changes.is_empty() {
            tracing::trace!(changes = changes.len(), "applying biome transitions");
        }
        for (x, y, biome, color) in changes {
            map.set(x, y, biome, color);
        }
    }
}

impl Default for BiomeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeCondition, BiomeType, NoiseChannel, Rgba};
    use crate::grid::Grid;

    const DESERT: Rgba = Rgba::rgb(230, 200, 120);
    const FOREST: Rgba = Rgba::rgb(30, 120, 30);
    const GRASS: Rgba = Rgba::rgb(100, 180, 60);

    fn definitions() -> Vec<BiomeDefinition> {
        vec![
            BiomeDefinition {
                name: "desert".into(),
                biome_type: BiomeType::Desert,
                color: DESERT,
                conditions: vec![BiomeCondition::new(NoiseChannel::Temperature, 0.5, 1.0)],
            },
            BiomeDefinition {
                name: "forest".into(),
                biome_type: BiomeType::Forest,
                color: FOREST,
                conditions: vec![BiomeCondition::new(NoiseChannel::Temperature, 0.0, 0.49)],
            },
            // Never matches in pass 1; only reachable through transitions.
            BiomeDefinition {
                name: "grassland".into(),
                biome_type: BiomeType::Grassland,
                color: GRASS,
                conditions: vec![BiomeCondition::new(NoiseChannel::Temperature, 2.0, 3.0)],
            },
        ]
    }

    fn desert_with_forest_at(size: usize, fx: usize, fy: usize) -> NoiseLayers {
        let mut layers = NoiseLayers::new();
        layers.insert(
            NoiseChannel::Temperature,
            Grid::from_fn(size, size, |x, y| if (x, y) == (fx, fy) { 0.2 } else { 0.8 }),
        );
        layers
    }

    fn desert_to_grass(radius: u32) -> TransitionRule {
        TransitionRule {
            source: BiomeType::Desert,
            target: BiomeType::Forest,
            replacement: BiomeType::Grassland,
            radius,
        }
    }

    #[test]
    fn test_first_matching_definition_wins() {
        let mut defs = definitions();
        defs.insert(
            1,
            BiomeDefinition {
                name: "hot".into(),
                biome_type: BiomeType::Mountains,
                color: Rgba::rgb(1, 2, 3),
                conditions: vec![BiomeCondition::new(NoiseChannel::Temperature, 0.0, 1.0)],
            },
        );
        let map = BiomeClassifier::new().assign(&desert_with_forest_at(4, 0, 0), &defs);
        // Desert is declared first and claims the hot cells.
        assert_eq!(map.biome(3, 3), Some(BiomeType::Desert));
        // The cold cell falls through to the catch-all before Forest.
        assert_eq!(map.biome(0, 0), Some(BiomeType::Mountains));
    }

    #[test]
    fn test_missing_channel_condition_is_skipped() {
        let mut defs = definitions();
        defs[0]
            .conditions
            .push(BiomeCondition::new(NoiseChannel::Moisture, 0.9, 1.0));
        let map = BiomeClassifier::new().assign(&desert_with_forest_at(4, 0, 0), &defs);
        assert_eq!(map.biome(2, 2), Some(BiomeType::Desert));
    }

    #[test]
    fn test_no_match_leaves_cell_empty() {
        let mut layers = NoiseLayers::new();
        layers.insert(NoiseChannel::Temperature, Grid::new(3, 3, 0.495));
        let map = BiomeClassifier::new().assign(&layers, &definitions());
        assert_eq!(map.biome(1, 1), None);
        assert_eq!(map.color(1, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_transition_scenario_recolors_disc_around_contact() {
        let layers = desert_with_forest_at(10, 5, 5);
        let map = BiomeClassifier::new().classify(&layers, &definitions(), &[desert_to_grass(2)]);

        // Desert cells touching the forest cell.
        let contacts: Vec<(i64, i64)> = (4..=6)
            .flat_map(|y| (4..=6).map(move |x| (x, y)))
            .filter(|&c| c != (5, 5))
            .collect();

        for y in 0..10 {
            for x in 0..10 {
                let biome = map.biome(x, y);
                if (x, y) == (5, 5) {
                    assert_eq!(biome, Some(BiomeType::Forest));
                    continue;
                }
                let near = contacts.iter().any(|&(cx, cy)| {
                    let (dx, dy) = (x as i64 - cx, y as i64 - cy);
                    dx * dx + dy * dy <= 4
                });
                if near {
                    assert_eq!(biome, Some(BiomeType::Grassland), "cell ({x}, {y})");
                    assert_eq!(map.color(x, y), Some(GRASS));
                } else {
                    assert_eq!(biome, Some(BiomeType::Desert), "cell ({x}, {y})");
                    assert_eq!(map.color(x, y), Some(DESERT));
                }
            }
        }
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let classifier = BiomeClassifier::new();
        let defs = definitions();
        let rules = [desert_to_grass(2)];
        let mut map = classifier.classify(&desert_with_forest_at(10, 5, 5), &defs, &rules);
        let once = map.clone();
        classifier.apply_transitions(&mut map, &defs, &rules);
        assert_eq!(map, once);
    }

    #[test]
    fn test_rule_without_replacement_definition_is_skipped() {
        let rule = TransitionRule {
            replacement: BiomeType::Snow,
            ..desert_to_grass(2)
        };
        let classifier = BiomeClassifier::new();
        let layers = desert_with_forest_at(6, 2, 2);
        let map = classifier.classify(&layers, &definitions(), &[rule]);
        assert_eq!(map, classifier.assign(&layers, &definitions()));
    }

    #[test]
    fn test_wider_adjacency_reaches_further() {
        let layers = desert_with_forest_at(12, 6, 6);
        let defs = definitions();
        let rules = [desert_to_grass(0)];
        let narrow = BiomeClassifier::new().classify(&layers, &defs, &rules);
        let wide = BiomeClassifier::with_adjacency_radius(2).classify(&layers, &defs, &rules);
        assert_eq!(narrow.count(BiomeType::Grassland), 8);
        assert_eq!(wide.count(BiomeType::Grassland), 24);
    }

    const SNOW: Rgba = Rgba::rgb(240, 240, 250);

    /// Desert and forest keyed on temperature and moisture together, plus
    /// replacement biomes that only transitions can produce.
    fn climate_definitions() -> Vec<BiomeDefinition> {
        let unreachable = || vec![BiomeCondition::new(NoiseChannel::Temperature, 2.0, 3.0)];
        vec![
            BiomeDefinition {
                name: "desert".into(),
                biome_type: BiomeType::Desert,
                color: DESERT,
                conditions: vec![
                    BiomeCondition::new(NoiseChannel::Temperature, 0.6, 1.0),
                    BiomeCondition::new(NoiseChannel::Moisture, 0.0, 0.3),
                ],
            },
            BiomeDefinition {
                name: "forest".into(),
                biome_type: BiomeType::Forest,
                color: FOREST,
                conditions: vec![
                    BiomeCondition::new(NoiseChannel::Temperature, 0.3, 0.6),
                    BiomeCondition::new(NoiseChannel::Moisture, 0.3, 0.7),
                ],
            },
            BiomeDefinition {
                name: "grassland".into(),
                biome_type: BiomeType::Grassland,
                color: GRASS,
                conditions: unreachable(),
            },
            BiomeDefinition {
                name: "snow".into(),
                biome_type: BiomeType::Snow,
                color: SNOW,
                conditions: unreachable(),
            },
        ]
    }

    /// 10x10 climate: hot and dry for `x < 5`, one temperate wet cell at
    /// (5, 5), and cold wet cells matching nothing elsewhere.
    fn desert_half_plane() -> NoiseLayers {
        let mut layers = NoiseLayers::new();
        layers.insert(
            NoiseChannel::Temperature,
            Grid::from_fn(10, 10, |x, y| match (x, y) {
                (5, 5) => 0.45,
                (x, _) if x < 5 => 0.8,
                _ => 0.1,
            }),
        );
        layers.insert(
            NoiseChannel::Moisture,
            Grid::from_fn(10, 10, |x, y| match (x, y) {
                (5, 5) => 0.5,
                (x, _) if x < 5 => 0.1,
                _ => 0.9,
            }),
        );
        layers
    }

    #[test]
    fn test_climate_scenario_recolors_within_two_cells_of_boundary() {
        let classifier = BiomeClassifier::new();
        let defs = climate_definitions();
        let layers = desert_half_plane();

        let assigned = classifier.assign(&layers, &defs);
        assert_eq!(assigned.biome(5, 5), Some(BiomeType::Forest));
        assert_eq!(assigned.biome(0, 0), Some(BiomeType::Desert));
        assert_eq!(assigned.biome(9, 9), None);

        let map = classifier.classify(&layers, &defs, &[desert_to_grass(2)]);

        // Desert cells touching the forest cell.
        let contacts = [(4i64, 4i64), (4, 5), (4, 6)];
        for y in 0..10 {
            for x in 0..10 {
                let was = assigned.biome(x, y);
                let now = map.biome(x, y);
                if was != Some(BiomeType::Desert) {
                    assert_eq!(now, was, "cell ({x}, {y})");
                    continue;
                }
                let near = contacts.iter().any(|&(cx, cy)| {
                    let (dx, dy) = (x as i64 - cx, y as i64 - cy);
                    dx * dx + dy * dy <= 4
                });
                let expected = if near {
                    BiomeType::Grassland
                } else {
                    BiomeType::Desert
                };
                assert_eq!(now, Some(expected), "cell ({x}, {y})");
            }
        }
        assert!(map.count(BiomeType::Grassland) > 0);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = BiomeClassifier::new();
        let defs = climate_definitions();
        let layers = desert_half_plane();
        let rules = [desert_to_grass(2)];

        let first = classifier.classify(&layers, &defs, &rules);
        let second = classifier.classify(&layers, &defs, &rules);
        assert_eq!(first, second);
        assert_eq!(first.colors, second.colors);
    }

    #[test]
    fn test_later_rule_wins_on_shared_cells() {
        let classifier = BiomeClassifier::new();
        let defs = climate_definitions();
        let layers = desert_half_plane();
        let to_snow = TransitionRule {
            replacement: BiomeType::Snow,
            ..desert_to_grass(2)
        };
        let rules = [desert_to_grass(2), to_snow];

        let single = classifier.classify(&layers, &defs, &[desert_to_grass(2)]);
        let mut map = classifier.classify(&layers, &defs, &rules);

        assert_eq!(map.count(BiomeType::Grassland), 0);
        assert_eq!(
            map.count(BiomeType::Snow),
            single.count(BiomeType::Grassland)
        );
        for y in 0..10 {
            for x in 0..10 {
                if single.biome(x, y) == Some(BiomeType::Grassland) {
                    assert_eq!(map.color(x, y), Some(SNOW), "cell ({x}, {y})");
                }
            }
        }

        let once = map.clone();
        classifier.apply_transitions(&mut map, &defs, &rules);
        assert_eq!(map, once);
    }

    #[test]
    fn test_edges_clip() {
        let layers = desert_with_forest_at(5, 0, 0);
        let map = BiomeClassifier::new().classify(&layers, &definitions(), &[desert_to_grass(1)]);
        assert_eq!(map.biome(0, 0), Some(BiomeType::Forest));
        assert_eq!(map.biome(1, 1), Some(BiomeType::Grassland));
        assert_eq!(map.biome(4, 4), Some(BiomeType::Desert));
    }
}
