//! Terrain debug visualization: 2D images of noise, falloff, height, and
//! biome grids for previews and diagnostics.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    height_to_color, render_biome_map, render_color_grid, render_height_bands, render_noise_map,
};
