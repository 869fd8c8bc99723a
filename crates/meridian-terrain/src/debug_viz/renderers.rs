//! Renderers turning terrain grids into [`DebugImage`]s.

use super::image::DebugImage;
use crate::biome::{BiomeMap, Rgba};
use crate::grid::Grid;
use crate::height_map::HeightMap;

/// Grayscale image of a scalar grid, black at its minimum and white at its
/// maximum. A flat grid renders black.
pub fn render_noise_map(values: &Grid<f32>) -> DebugImage {
    let (min, max) = values
        .cells()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    let mut image = DebugImage::new(values.width() as u32, values.height() as u32);
    for (x, y, &v) in values.iter() {
        let t = if range > 0.0 { (v - min) / range } else { 0.0 };
        let level = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
        image.set_pixel(x as u32, y as u32, [level, level, level, 255]);
    }
    image
}

/// Image of a color grid, one pixel per cell.
pub fn render_color_grid(colors: &Grid<Rgba>) -> DebugImage {
    let mut image = DebugImage::new(colors.width() as u32, colors.height() as u32);
    for (x, y, color) in colors.iter() {
        image.set_pixel(x as u32, y as u32, color.0);
    }
    image
}

/// Biome colors; unassigned cells stay transparent.
pub fn render_biome_map(map: &BiomeMap) -> DebugImage {
    render_color_grid(&map.colors)
}

/// Map a normalized height `[0, 1]` to an elevation color.
///
/// Color bands: deep water, shallow water, beach, lowlands, mountains, snow.
/// `sea_level` is the normalized height of the shoreline.
pub fn height_to_color(normalized: f32, sea_level: f32) -> [u8; 4] {
    let (r, g, b) = if normalized < sea_level * 0.5 {
        (0, 0, 128)
    } else if normalized < sea_level {
        (30, 80, 200)
    } else if normalized < sea_level + 0.02 {
        (220, 200, 130)
    } else if normalized < 0.55 {
        let t = ((normalized - sea_level) / (0.55 - sea_level)).clamp(0.0, 1.0);
        (
            (30.0 + t * 80.0) as u8,
            (160.0 - t * 40.0) as u8,
            (30.0 + t * 20.0) as u8,
        )
    } else if normalized < 0.75 {
        let t = (normalized - 0.55) / 0.2;
        (
            (110.0 + t * 40.0) as u8,
            (120.0 - t * 50.0) as u8,
            (50.0 + t * 20.0) as u8,
        )
    } else {
        let t = ((normalized - 0.75) / 0.25).min(1.0);
        let base = (150.0 + t * 105.0) as u8;
        (base, base, base)
    };
    [r, g, b, 255]
}

/// Banded elevation image of a height map's interior (border ring excluded).
pub fn render_height_bands(map: &HeightMap, sea_level: f32) -> DebugImage {
    let size = map.interior_size();
    let mut image = DebugImage::new(size as u32, size as u32);
    for y in 0..size {
        for x in 0..size {
            let h = map.values[(x + 1, y + 1)];
            image.set_pixel(x as u32, y as u32, height_to_color(h, sea_level));
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeType;
    use crate::falloff::{FalloffField, FalloffShape};
    use crate::curve::ResponseCurve;

    #[test]
    fn test_noise_map_spans_black_to_white() {
        let grid = Grid::from_fn(4, 1, |x, _| x as f32);
        let image = render_noise_map(&grid);
        assert_eq!(image.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(3, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_flat_noise_map_renders_black() {
        let image = render_noise_map(&Grid::new(3, 3, 0.7));
        assert_eq!(image.unique_color_count(), 1);
        assert_eq!(image.get_pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_falloff_preview_is_bright_at_edges() {
        let falloff = FalloffField::generate(9, FalloffShape::Square, &ResponseCurve::linear());
        let image = render_noise_map(&falloff);
        assert_eq!(image.get_pixel(0, 4), [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(4, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn test_biome_map_uses_definition_colors() {
        let mut map = BiomeMap::empty(2, 1);
        map.set(0, 0, BiomeType::Desert, Rgba::rgb(220, 190, 80));
        let image = render_biome_map(&map);
        assert_eq!(image.get_pixel(0, 0), [220, 190, 80, 255]);
        assert_eq!(image.get_pixel(1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_height_bands_exclude_border() {
        let map = HeightMap::new(Grid::from_fn(6, 6, |x, y| (x + y) as f32 / 10.0));
        let image = render_height_bands(&map, 0.3);
        assert_eq!(image.dimensions(), (4, 4));
        assert!(image.unique_color_count() > 1);
    }

    #[test]
    fn test_height_to_color_covers_full_range() {
        assert_eq!(height_to_color(0.0, 0.4), [0, 0, 128, 255]);
        assert_eq!(height_to_color(1.0, 0.4), [255, 255, 255, 255]);
        for i in 0..=100 {
            let [_, _, _, a] = height_to_color(i as f32 / 100.0, 0.4);
            assert_eq!(a, 255);
        }
    }
}
