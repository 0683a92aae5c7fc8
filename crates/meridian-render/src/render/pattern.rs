//! Tile-space helpers and uniforms shared by pattern-filled layers.

use crate::atlas::ImagePosition;
use crate::gl::UniformValues;
use crate::source::{EXTENT, OverscaledTileId};
use crate::style::CrossfadeParameters;

/// Tile units covered by `pixel_value` CSS pixels at zoom `z`.
pub fn pixels_to_tile_units(
    tile: &OverscaledTileId,
    tile_size: u32,
    pixel_value: f32,
    z: f32,
) -> f32 {
    pixel_value * (EXTENT as f32 / (tile_size as f32 * 2f32.powf(z - f32::from(tile.overscaled_z))))
}

/// Pixel position of the tile's origin at `tile_zoom`, split into high and
/// low 16 bits so shaders keep precision at high zoom.
pub fn pixel_coords(
    tile: &OverscaledTileId,
    tile_size: u32,
    tile_zoom: f32) -> ([f32; 2], [f32; 2],
) {
    let num_tiles = 2f64.powi(i32::from(tile.overscaled_z));
    let size_at_nearest_zoom = f64::from(tile_size) * 2f64.powf(f64::from(tile_zoom)) / num_tiles;
    let x = size_at_nearest_zoom * (f64::from(tile.canonical.x) + f64::from(tile.wrap) * num_tiles);
    let y = size_at_nearest_zoom * f64::from(tile.canonical.y);
    let (x, y) = (x as i64, y as i64);
    (
        [(x >> 16) as f32, (y >> 16) as f32],
        [(x & 0xFFFF) as f32, (y & 0xFFFF) as f32],
    )
}

/// Uniforms for patterns packed in the tile's own image atlas.
pub fn pattern_uniforms(
    crossfade: &CrossfadeParameters,
    pixel_ratio: f32,
    tile: &OverscaledTileId,
    tile_size: u32,
    tile_zoom: f32,
    atlas_size: [u32; 2],
) -> UniformValues {
    let tile_ratio = 1.0 / pixels_to_tile_units(tile, tile_size, 1.0, tile_zoom);
    let (upper, lower) = pixel_coords(tile, tile_size, tile_zoom);
    UniformValues::new()
        .with("u_image", 0_i32)
        .with("u_texsize", [atlas_size[0] as f32, atlas_size[1] as f32])
        .with("u_scale", [pixel_ratio, tile_ratio, crossfade.from_scale, crossfade.to_scale])
        .with("u_fade", crossfade.t)
        .with("u_pixel_coord_upper", upper)
        .with("u_pixel_coord_lower", lower)
}

/// Background pattern uniforms; both generations come from the shared atlas.
#[allow(clippy::too_many_arguments)]
pub fn background_pattern_uniforms(
    from: &ImagePosition,
    to: &ImagePosition,
    crossfade: &CrossfadeParameters,
    atlas_size: [u32; 2],
    tile: &OverscaledTileId,
    tile_size: u32,
    tile_zoom: f32,
) -> UniformValues {
    let corner = |p: [u32; 2]| [p[0] as f32, p[1] as f32];
    let (upper, lower) = pixel_coords(tile, tile_size, tile_zoom);
    UniformValues::new()
        .with("u_image", 0_i32)
        .with("u_pattern_tl_a", corner(from.tl()))
        .with("u_pattern_br_a", corner(from.br()))
        .with("u_pattern_tl_b", corner(to.tl()))
        .with("u_pattern_br_b", corner(to.br()))
        .with("u_texsize", [atlas_size[0] as f32, atlas_size[1] as f32])
        .with("u_mix", crossfade.t)
        .with("u_pattern_size_a", from.display_size())
        .with("u_pattern_size_b", to.display_size())
        .with("u_scale_a", crossfade.from_scale)
        .with("u_scale_b", crossfade.to_scale)
        .with(
            "u_tile_units_to_pixels",
            1.0 / pixels_to_tile_units(tile, tile_size, 1.0, tile_zoom),
        )
        .with("u_pixel_coord_upper", upper)
        .with("u_pixel_coord_lower", lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::UniformData;
    use crate::source::CanonicalTileId;

    #[test]
    fn tile_units_at_tile_zoom() {
        let tile = OverscaledTileId::canonical(3, 0, 0);
        assert_eq!(pixels_to_tile_units(&tile, 512, 1.0, 3.0), 16.0);
        assert_eq!(pixels_to_tile_units(&tile, 512, 1.0, 4.0), 8.0);
    }

    #[test]
    fn pixel_coords_split_high_bits() {
        let tile = OverscaledTileId::canonical(10, 300, 2);
        let (upper, lower) = pixel_coords(&tile, 512, 10.0);
        // x = 512 * 300 = 153600 = 2 * 65536 + 22528
        assert_eq!(upper, [2.0, 0.0]);
        assert_eq!(lower, [22528.0, 1024.0]);
    }

    #[test]
    fn wrapped_tiles_shift_by_world_width() {
        let tile = OverscaledTileId::new(1, 1, CanonicalTileId::new(1, 0, 0));
        let (upper, lower) = pixel_coords(&tile, 512, 1.0);
        assert_eq!(upper[0] * 65536.0 + lower[0], 1024.0);
    }

    #[test]
    fn scale_carries_crossfade() {
        let crossfade = CrossfadeParameters {
            from_scale: 2.0,
            to_scale: 1.0,
            t: 0.25,
        };
        let tile = OverscaledTileId::canonical(3, 0, 0);
        let u = pattern_uniforms(&crossfade, 2.0, &tile, 512, 3.0, [64, 32]);
        assert_eq!(u.get("u_scale"), Some(&UniformData::Vec4([2.0, 1.0 / 16.0, 2.0, 1.0])));
        assert_eq!(u.get("u_texsize"), Some(&UniformData::Vec2([64.0, 32.0])));
    }
}
