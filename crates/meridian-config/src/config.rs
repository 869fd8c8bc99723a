//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use meridian_lod::{DetailLevels, LodInfo, SUPPORTED_LOD_COUNT};
use meridian_mesh::MeshSettings;
use meridian_stream::StreamSettings;
use meridian_terrain::{
    BiomeClassifier, BiomeCondition, BiomeDefinition, BiomeType, HeightMapSettings, NoiseChannel,
    NoiseParameters, NormalizeMode, Rgba, TransitionRule,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
pub const CONFIG_FILE_NAME: &str = "terrain.ron";

/// `<platform config dir>/meridian`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("meridian"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Top-level terrain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Height noise, curve, multiplier, and falloff.
    pub height_map: HeightMapSettings,
    /// Noise driving the biome channels.
    pub climate: ClimateConfig,
    /// Chunk size and scale.
    pub mesh: MeshSettings,
    /// Detail levels and collider level.
    pub lod: LodConfig,
    /// Chunk streaming around the viewer.
    pub streaming: StreamSettings,
    pub biomes: BiomeConfig,
    /// Headless preview run.
    pub preview: PreviewConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Temperature and moisture noise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClimateConfig {
    pub temperature: NoiseParameters,
    pub moisture: NoiseParameters,
}

/// Detail levels as stored on disk. Checked by [`LodConfig::to_detail_levels`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Ascending by `visible_distance`.
    pub detail_levels: Vec<LodInfo>,
    /// Index into `detail_levels` of the level used for collision.
    pub collider_index: usize,
}

/// Biome definitions and boundary smoothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeConfig {
    /// Matched in order; the first match wins.
    pub definitions: Vec<BiomeDefinition>,
    pub transition_rules: Vec<TransitionRule>,
    /// Chebyshev radius for detecting contact with a rule's target.
    pub adjacency_radius: u32,
}

/// Settings for the headless preview binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    /// LOD used for the single-chunk mesh preview.
    pub lod: u8,
    /// Streaming frames to simulate.
    pub frames: u32,
    /// Viewer movement per frame, in world units.
    pub viewer_speed: f32,
    /// Normalized height below which the band preview draws water.
    pub sea_level: f32,
    /// Where preview images are written. Defaults to `<config dir>/preview`.
    pub output_dir: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        let mut height_map = HeightMapSettings::default();
        // Streamed chunks must share one normalization to line up.
        height_map.noise.normalize_mode = NormalizeMode::Global;
        height_map.noise.scale = 120.0;
        height_map.noise.octaves = 5;

        Self {
            height_map,
            climate: ClimateConfig::default(),
            mesh: MeshSettings::default(),
            lod: LodConfig::default(),
            streaming: StreamSettings::default(),
            biomes: BiomeConfig::default(),
            preview: PreviewConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        let base = NoiseParameters {
            octaves: 3,
            scale: 300.0,
            normalize_mode: NormalizeMode::Global,
            ..NoiseParameters::default()
        };
        Self {
            temperature: NoiseParameters {
                seed: 1,
                ..base.clone()
            },
            moisture: NoiseParameters {
                seed: 2,
                scale: 220.0,
                ..base
            },
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        let levels = DetailLevels::default();
        Self {
            detail_levels: levels.levels().to_vec(),
            collider_index: levels.collider_index(),
        }
    }
}

impl Default for BiomeConfig {
    fn default() -> Self {
        let biome = |name: &str, biome_type, color, conditions| BiomeDefinition {
            name: name.to_string(),
            biome_type,
            color,
            conditions,
        };
        Self {
            definitions: vec![
                biome(
                    "mountains",
                    BiomeType::Mountains,
                    Rgba::rgb(120, 110, 100),
                    vec![BiomeCondition::new(NoiseChannel::Elevation, 0.8, 1.0)],
                ),
                biome(
                    "snow",
                    BiomeType::Snow,
                    Rgba::rgb(240, 245, 250),
                    vec![BiomeCondition::new(NoiseChannel::Temperature, 0.0, 0.25)],
                ),
                biome(
                    "desert",
                    BiomeType::Desert,
                    Rgba::rgb(230, 200, 120),
                    vec![
                        BiomeCondition::new(NoiseChannel::Temperature, 0.65, 1.0),
                        BiomeCondition::new(NoiseChannel::Moisture, 0.0, 0.4),
                    ],
                ),
                biome(
                    "forest",
                    BiomeType::Forest,
                    Rgba::rgb(30, 110, 40),
                    vec![BiomeCondition::new(NoiseChannel::Moisture, 0.55, 1.0)],
                ),
                biome("grassland", BiomeType::Grassland, Rgba::rgb(110, 170, 70), vec![]),
            ],
            transition_rules: vec![TransitionRule {
                source: BiomeType::Desert,
                target: BiomeType::Forest,
                replacement: BiomeType::Grassland,
                radius: 2,
            }],
            adjacency_radius: BiomeClassifier::DEFAULT_ADJACENCY_RADIUS,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            lod: 0,
            frames: 120,
            viewer_speed: 8.0,
            sea_level: 0.3,
            output_dir: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Derived views ---

impl LodConfig {
    pub fn to_detail_levels(&self) -> Result<DetailLevels, ConfigError> {
        Ok(DetailLevels::new(
            self.detail_levels.clone(),
            self.collider_index,
        )?)
    }
}

impl Config {
    pub fn detail_levels(&self) -> Result<DetailLevels, ConfigError> {
        self.lod.to_detail_levels()
    }

    pub fn classifier(&self) -> BiomeClassifier {
        BiomeClassifier::with_adjacency_radius(self.biomes.adjacency_radius)
    }

    /// Noise parameters per biome channel. Elevation reuses the height noise.
    pub fn noise_channels(&self) -> Vec<(NoiseChannel, NoiseParameters)> {
        vec![
            (NoiseChannel::Temperature, self.climate.temperature.clone()),
            (NoiseChannel::Moisture, self.climate.moisture.clone()),
            (NoiseChannel::Elevation, self.height_map.noise.clone()),
        ]
    }

    /// Clamp degenerate values so every generator can trust its inputs.
    ///
    /// Unusable detail levels are replaced by the defaults.
    pub fn validate(&mut self) {
        self.height_map.validate();
        self.climate.temperature.validate();
        self.climate.moisture.validate();
        self.mesh.validate();
        self.streaming.validate();

        self.preview.lod = self.preview.lod.min(SUPPORTED_LOD_COUNT - 1);
        self.preview.frames = self.preview.frames.max(1);
        self.preview.sea_level = self.preview.sea_level.clamp(0.0, 1.0);

        for def in &mut self.biomes.definitions {
            for cond in &mut def.conditions {
                if cond.min > cond.max {
                    std::mem::swap(&mut cond.min, &mut cond.max);
                }
            }
        }

        if let Err(e) = self.lod.to_detail_levels() {
            log::warn!("{e}, using default detail levels");
            self.lod = LodConfig::default();
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// The loaded config is validated before it is returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let mut config = Self::read(&config_path)?;
            config.validate();
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `terrain.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let mut new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        new_config.validate();

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
