//! Headless Meridian preview.
//!
//! Renders single-chunk previews of every generation stage to PNG, then
//! streams terrain around a moving viewer on the worker pool and reports
//! what was generated.
//!
//! Run with: `cargo run -p meridian-demo -- --frames 200`

mod previews;
mod streaming;

use std::path::PathBuf;

use clap::Parser;
use meridian_config::{CliArgs, Config, ConfigError, default_config_dir};
use tracing::info;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write preview image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), DemoError> {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => dir,
        None => default_config_dir()?,
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    meridian_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Meridian preview: seed={}, chunk size={}, world size={:.0}",
        config.height_map.noise.seed,
        config.mesh.chunk_size(),
        config.mesh.world_size()
    );

    let output_dir: PathBuf = config
        .preview
        .output_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("preview"));
    std::fs::create_dir_all(&output_dir)?;

    previews::demonstrate_previews(&config, &output_dir)?;
    let stats = streaming::demonstrate_streaming(&config, &output_dir)?;

    info!(
        "Done: {} chunks, {} visible, {} meshes, {} colliders; images in {}",
        stats.chunks,
        stats.visible,
        stats.meshes,
        stats.colliders,
        output_dir.display()
    );
    Ok(())
}
