//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Meridian terrain preview arguments.
///
/// CLI values override settings loaded from `terrain.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "meridian", about = "Streamed LOD terrain preview")]
pub struct CliArgs {
    /// Height noise seed.
    #[arg(long)]
    pub seed: Option<i32>,

    /// Index into the supported chunk sizes (0 = 48 ... 8 = 240).
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// LOD for the single-chunk mesh preview.
    #[arg(long)]
    pub lod: Option<u8>,

    /// Number of streaming frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Generation worker threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for preview images.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config, then re-validate.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.height_map.noise.seed = seed;
        }
        if let Some(index) = args.chunk_size {
            self.mesh.chunk_size_index = index;
        }
        if let Some(lod) = args.lod {
            self.preview.lod = lod;
        }
        if let Some(frames) = args.frames {
            self.preview.frames = frames;
        }
        if let Some(workers) = args.workers {
            self.streaming.worker_threads = Some(workers);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref output) = args.output {
            self.preview.output_dir = Some(output.clone());
        }
        self.validate();
    }
}
