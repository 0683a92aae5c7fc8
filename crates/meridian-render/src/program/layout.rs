//! Fixed attributes and uniforms of each program. Paint-property uniforms
//! come from the [`ProgramConfiguration`](super::ProgramConfiguration) instead.

use crate::gl::UniformKind::{self, Color, Float, Int, Mat4, Vec2, Vec3, Vec4};

use super::ShaderId;

#[derive(Debug, Copy, Clone)]
pub struct ProgramLayout {
    pub attributes: &'static [&'static str],
    pub uniforms: &'static [(&'static str, UniformKind)],
}

const POS: &[&str] = &["a_pos"];
const RASTER: &[&str] = &["a_pos", "a_texture_pos"];
const LINE: &[&str] = &["a_pos_normal", "a_data"];
const SYMBOL: &[&str] = &["a_pos_offset", "a_data", "a_projected_pos", "a_fade_opacity"];
const EXTRUSION: &[&str] = &["a_pos", "a_normal_ed"];
const COLLISION: &[&str] = &["a_pos", "a_anchor_pos", "a_extrude", "a_placed", "a_shift"];

macro_rules! uniforms {
    ($($name:literal : $kind:ident),* $(,)?) => {
        &[$(($name, $kind)),*]
    };
}

const SYMBOL_ICON_UNIFORMS: &[(&str, UniformKind)] = uniforms! {
    "u_is_size_zoom_constant": Int,
    "u_is_size_feature_constant": Int,
    "u_size_t": Float,
    "u_size": Float,
    "u_camera_to_center_distance": Float,
    "u_pitch": Float,
    "u_rotate_symbol": Int,
    "u_aspect_ratio": Float,
    "u_fade_change": Float,
    "u_matrix": Mat4,
    "u_label_plane_matrix": Mat4,
    "u_coord_matrix": Mat4,
    "u_is_text": Int,
    "u_pitch_with_map": Int,
    "u_texsize": Vec2,
    "u_texture": Int,
};

const SYMBOL_SDF_UNIFORMS: &[(&str, UniformKind)] = uniforms! {
    "u_is_size_zoom_constant": Int,
    "u_is_size_feature_constant": Int,
    "u_size_t": Float,
    "u_size": Float,
    "u_camera_to_center_distance": Float,
    "u_pitch": Float,
    "u_rotate_symbol": Int,
    "u_aspect_ratio": Float,
    "u_fade_change": Float,
    "u_matrix": Mat4,
    "u_label_plane_matrix": Mat4,
    "u_coord_matrix": Mat4,
    "u_is_text": Int,
    "u_pitch_with_map": Int,
    "u_texsize": Vec2,
    "u_texture": Int,
    "u_gamma_scale": Float,
    "u_device_pixel_ratio": Float,
    "u_is_halo": Int,
};

const FILL_EXTRUSION_UNIFORMS: &[(&str, UniformKind)] = uniforms! {
    "u_matrix": Mat4,
    "u_lightpos": Vec3,
    "u_lightintensity": Float,
    "u_lightcolor": Vec3,
    "u_vertical_gradient": Float,
    "u_opacity": Float,
};

pub fn program_layout(shader: ShaderId) -> ProgramLayout {
    let (attributes, uniforms): (&'static [&'static str], &'static [(&'static str, UniformKind)]) =
        match shader {
            ShaderId::ClippingMask => (POS, uniforms! { "u_matrix": Mat4 }),
            ShaderId::Background => (
                POS,
                uniforms! { "u_matrix": Mat4, "u_opacity": Float, "u_color": Color },
            ),
            ShaderId::BackgroundPattern => (
                POS,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_opacity": Float,
                    "u_image": Int,
                    "u_pattern_tl_a": Vec2,
                    "u_pattern_br_a": Vec2,
                    "u_pattern_tl_b": Vec2,
                    "u_pattern_br_b": Vec2,
                    "u_pattern_size_a": Vec2,
                    "u_pattern_size_b": Vec2,
                    "u_texsize": Vec2,
                    "u_mix": Float,
                    "u_scale_a": Float,
                    "u_scale_b": Float,
                    "u_tile_units_to_pixels": Float,
                    "u_pixel_coord_upper": Vec2,
                    "u_pixel_coord_lower": Vec2,
                },
            ),
            ShaderId::Fill => (POS, uniforms! { "u_matrix": Mat4 }),
            ShaderId::FillOutline => (POS, uniforms! { "u_matrix": Mat4, "u_world": Vec2 }),
            ShaderId::FillPattern => (POS, with_pattern(shader)),
            ShaderId::FillOutlinePattern => (POS, with_pattern(shader)),
            ShaderId::Line => (
                LINE,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_ratio": Float,
                    "u_device_pixel_ratio": Float,
                    "u_units_to_pixels": Vec2,
                },
            ),
            ShaderId::LinePattern => (
                LINE,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_ratio": Float,
                    "u_device_pixel_ratio": Float,
                    "u_units_to_pixels": Vec2,
                    "u_texsize": Vec2,
                    "u_image": Int,
                    "u_scale": Vec3,
                    "u_fade": Float,
                },
            ),
            ShaderId::Circle => (
                POS,
                uniforms! {
                    "u_camera_to_center_distance": Float,
                    "u_scale_with_map": Int,
                    "u_matrix": Mat4,
                    "u_pitch_with_map": Int,
                    "u_device_pixel_ratio": Float,
                    "u_extrude_scale": Vec2,
                },
            ),
            ShaderId::SymbolIcon => (SYMBOL, SYMBOL_ICON_UNIFORMS),
            ShaderId::SymbolSdf => (SYMBOL, SYMBOL_SDF_UNIFORMS),
            ShaderId::FillExtrusion => (EXTRUSION, FILL_EXTRUSION_UNIFORMS),
            ShaderId::FillExtrusionPattern => (EXTRUSION, with_pattern(shader)),
            ShaderId::Raster => (
                RASTER,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_tl_parent": Vec2,
                    "u_scale_parent": Float,
                    "u_buffer_scale": Float,
                    "u_fade_t": Float,
                    "u_opacity": Float,
                    "u_image0": Int,
                    "u_image1": Int,
                    "u_brightness_low": Float,
                    "u_brightness_high": Float,
                    "u_saturation_factor": Float,
                    "u_contrast_factor": Float,
                    "u_spin_weights": Vec3,
                },
            ),
            ShaderId::HillshadePrepare => (
                RASTER,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_image": Int,
                    "u_dimension": Vec2,
                    "u_zoom": Float,
                    "u_unpack": Vec4,
                },
            ),
            ShaderId::Hillshade => (
                RASTER,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_image": Int,
                    "u_latrange": Vec2,
                    "u_light": Vec2,
                    "u_shadow": Color,
                    "u_highlight": Color,
                    "u_accent": Color,
                },
            ),
            ShaderId::Debug => (
                POS,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_color": Color,
                    "u_overlay": Int,
                    "u_overlay_scale": Float,
                },
            ),
            ShaderId::CollisionBox => (
                COLLISION,
                uniforms! {
                    "u_matrix": Mat4,
                    "u_camera_to_center_distance": Float,
                    "u_pixels_to_tile_units": Float,
                    "u_extrude_scale": Vec2,
                    "u_overscale_factor": Float,
                },
            ),
        };

    ProgramLayout {
        attributes,
        uniforms,
    }
}

/// Uniform tables of the tile-pattern programs.
fn with_pattern(shader: ShaderId) -> &'static [(&'static str, UniformKind)] {
    const FILL_PATTERN: &[(&str, UniformKind)] = &[
        ("u_matrix", Mat4),
        ("u_image", Int),
        ("u_texsize", Vec2),
        ("u_scale", Vec4),
        ("u_fade", Float),
        ("u_pixel_coord_upper", Vec2),
        ("u_pixel_coord_lower", Vec2),
    ];
    const FILL_OUTLINE_PATTERN: &[(&str, UniformKind)] = &[
        ("u_matrix", Mat4),
        ("u_world", Vec2),
        ("u_image", Int),
        ("u_texsize", Vec2),
        ("u_scale", Vec4),
        ("u_fade", Float),
        ("u_pixel_coord_upper", Vec2),
        ("u_pixel_coord_lower", Vec2),
    ];
    const FILL_EXTRUSION_PATTERN: &[(&str, UniformKind)] = &[
        ("u_matrix", Mat4),
        ("u_lightpos", Vec3),
        ("u_lightintensity", Float),
        ("u_lightcolor", Vec3),
        ("u_vertical_gradient", Float),
        ("u_opacity", Float),
        ("u_height_factor", Float),
        ("u_image", Int),
        ("u_texsize", Vec2),
        ("u_scale", Vec4),
        ("u_fade", Float),
        ("u_pixel_coord_upper", Vec2),
        ("u_pixel_coord_lower", Vec2),
    ];

    match shader {
        ShaderId::FillOutlinePattern => FILL_OUTLINE_PATTERN,
        ShaderId::FillExtrusionPattern => FILL_EXTRUSION_PATTERN,
        _ => FILL_PATTERN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN_TILE: &[(&str, UniformKind)] = &[
        ("u_image", Int),
        ("u_texsize", Vec2),
        ("u_scale", Vec4),
        ("u_fade", Float),
        ("u_pixel_coord_upper", Vec2),
        ("u_pixel_coord_lower", Vec2),
    ];

    #[test]
    fn every_program_has_a_matrix() {
        for id in ShaderId::ALL {
            let layout = program_layout(id);
            assert!(
                layout.uniforms.iter().any(|(n, k)| *n == "u_matrix" && *k == Mat4),
                "{id} lacks u_matrix"
            );
            assert!(!layout.attributes.is_empty());
        }
    }

    #[test]
    fn pattern_programs_share_tile_uniforms() {
        for id in [
            ShaderId::FillPattern,
            ShaderId::FillOutlinePattern,
            ShaderId::FillExtrusionPattern,
        ] {
            let layout = program_layout(id);
            for (name, kind) in PATTERN_TILE {
                assert!(layout.uniforms.contains(&(*name, *kind)), "{id} lacks {name}");
            }
        }
    }
}
