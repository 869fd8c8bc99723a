//! Configuration for Meridian terrain generation.
//!
//! Settings persist to disk as a RON file. Every section is
//! `#[serde(default)]`, so older or partial files keep loading, and CLI
//! arguments override whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BiomeConfig, CONFIG_FILE_NAME, ClimateConfig, Config, DebugConfig, LodConfig, PreviewConfig,
    default_config_dir,
};
pub use error::ConfigError;
