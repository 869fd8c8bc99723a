//! Single-chunk previews of each generation stage.

use std::path::Path;

use glam::Vec2;
use meridian_config::Config;
use meridian_mesh::MeshBuilder;
use meridian_terrain::debug_viz::{
    DebugImage, render_biome_map, render_height_bands, render_noise_map,
};
use meridian_terrain::{BiomeType, FalloffField, HeightMapBuilder, NoiseChannel, NoiseLayers};
use tracing::info;

/// Write a debug image as PNG.
pub(crate) fn save_png(image: &DebugImage, path: &Path) -> Result<(), image::ImageError> {
    image::save_buffer(
        path,
        &image.pixels,
        image.width,
        image.height,
        image::ExtendedColorType::Rgba8,
    )
}

/// Height, falloff, climate, biome, and mesh previews for the chunk at the origin.
pub(crate) fn demonstrate_previews(config: &Config, out: &Path) -> Result<(), image::ImageError> {
    info!("Starting chunk preview demonstration");

    let size = config.mesh.vertices_per_line();
    let builder = HeightMapBuilder::new(config.height_map.clone());
    let height_map = builder.build(size, Vec2::ZERO);
    info!(
        "Height map: {size}x{size}, range [{:.3}, {:.3}]",
        height_map.min_value, height_map.max_value
    );

    save_png(&render_noise_map(&height_map.values), &out.join("height.png"))?;
    save_png(
        &render_height_bands(&height_map, config.preview.sea_level),
        &out.join("height_bands.png"),
    )?;

    let falloff = FalloffField::generate(
        size,
        config.height_map.falloff_shape,
        &config.height_map.falloff_curve,
    );
    save_png(&render_noise_map(&falloff), &out.join("falloff.png"))?;

    let layers = NoiseLayers::generate(size, Vec2::ZERO, &config.noise_channels());
    for (channel, file) in [
        (NoiseChannel::Temperature, "temperature.png"),
        (NoiseChannel::Moisture, "moisture.png"),
    ] {
        if let Some(sample) = layers.get(channel) {
            save_png(&render_noise_map(sample), &out.join(file))?;
        }
    }

    let biomes = config.classifier().classify(
        &layers,
        &config.biomes.definitions,
        &config.biomes.transition_rules,
    );
    let biome_image = render_biome_map(&biomes);
    save_png(&biome_image, &out.join("biomes.png"))?;
    for biome in [
        BiomeType::Mountains,
        BiomeType::Snow,
        BiomeType::Desert,
        BiomeType::Forest,
        BiomeType::Grassland,
    ] {
        info!("Biome {biome:?}: {} cells", biomes.count(biome));
    }
    info!(
        "Biome map: {} unique colors",
        biome_image.unique_color_count()
    );

    let mesh = MeshBuilder::from_settings(&config.height_map, &config.mesh)
        .build(&height_map, config.preview.lod);
    let packed = mesh.pack();
    info!(
        "Mesh at LOD {}: {} vertices, {} triangles, {} vertex bytes, {} index bytes",
        config.preview.lod,
        mesh.vertex_count(),
        mesh.triangle_count(),
        packed.vertex_buffer_bytes(),
        packed.index_buffer_bytes()
    );

    info!("Chunk preview demonstration completed successfully");
    Ok(())
}
