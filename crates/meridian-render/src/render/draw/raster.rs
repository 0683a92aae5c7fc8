use crate::error::Result;
use crate::gl::{
    Backend, CompareFunc, CullFaceMode, DepthMask, Primitive, TextureWrap, UniformValues,
};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter};
use crate::render::pass::RenderPass;
use crate::source::{SourceCache, Tile};
use crate::style::RasterPaint;
use crate::transform::Transform;

/// Cross-fade between a tile and its loaded parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeValues {
    pub opacity: f32,
    /// Weight of the parent texture.
    pub mix: f32,
}

/// Raster tiles, each drawn over whatever parent it is fading from.
///
/// Tiles of different zooms overlap while loading; the overlap stencil keeps
/// the highest zoom on top.
pub fn draw_raster<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &RasterPaint,
) -> Result<()> {
    if draw.pass() != RenderPass::Translucent || paint.opacity == 0.0 || draw.coords.is_empty() {
        return Ok(());
    }
    let Some(source) = draw.source else { return Ok(()) };
    let transform = draw.frame.transform;
    let options = draw.frame.options;
    let buffers = painter.ensure_buffers();
    let color = painter.color_mode_for_render_pass(draw.pass());

    let stencil_modes = painter.stencil_config_for_overlap(draw.coords);
    let Some(min_z) = stencil_modes.last().map(|(c, _)| c.overscaled_z) else { return Ok(()) };
    let mask = if paint.opacity == 1.0 {
        DepthMask::ReadWrite
    } else {
        DepthMask::ReadOnly
    };
    let align = !options.moving;

    for (coord, stencil) in &stencil_modes {
        let Some(tile) = source.tile(coord) else { continue };
        let Some(texture) = tile.raster_texture else { continue };
        let depth = draw.frame.depth_mode_for_sublayer(
            draw.layer_index,
            u32::from(coord.overscaled_z - min_z),
            mask,
            CompareFunc::Less,
        );
        let pos_matrix = transform.pos_matrix(&coord.to_unwrapped(), align);

        let parent = source.find_loaded_parent(coord, 0);
        let fade = fade_values(tile, parent, source, paint.fade_duration, transform, options.now);

        painter
            .context
            .bind_texture(0, &texture, paint.resampling, TextureWrap::Clamp);
        let parent = parent.and_then(|p| p.raster_texture.map(|t| (p, t)));
        let (tl_parent, scale_parent) = match parent {
            Some((parent, parent_texture)) => {
                painter
                    .context
                    .bind_texture(1, &parent_texture, paint.resampling, TextureWrap::Clamp);
                let scale =
                    2f32.powi(i32::from(parent.id.overscaled_z) - i32::from(coord.overscaled_z));
                let tl = [
                    (coord.canonical.x as f32 * scale) % 1.0,
                    (coord.canonical.y as f32 * scale) % 1.0,
                ];
                (tl, scale)
            }
            None => {
                painter
                    .context
                    .bind_texture(1, &texture, paint.resampling, TextureWrap::Clamp);
                ([0.0, 0.0], 1.0)
            }
        };

        let uniforms = UniformValues::new()
            .with("u_matrix", pos_matrix)
            .with("u_tl_parent", tl_parent)
            .with("u_scale_parent", scale_parent)
            .with("u_buffer_scale", 1.0)
            .with("u_fade_t", fade.mix)
            .with("u_opacity", fade.opacity * paint.opacity)
            .with("u_image0", 0_i32)
            .with("u_image1", 1_i32)
            .with("u_brightness_low", paint.brightness_min)
            .with("u_brightness_high", paint.brightness_max)
            .with("u_saturation_factor", saturation_factor(paint.saturation))
            .with("u_contrast_factor", contrast_factor(paint.contrast))
            .with("u_spin_weights", spin_weights(paint.hue_rotate));

        painter.draw_program(
            ShaderId::Raster,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil: *stencil,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms: &uniforms,
                configuration: None,
                paint: None,
                zoom: transform.zoom(),
                layout_vertex_buffer: &buffers.raster_bounds,
                index_buffer: &buffers.quad_indices,
                segments: &buffers.quad_segments,
                extra_vertex_buffers: &[],
            },
        )?;
    }
    Ok(())
}

/// Tiles fade in over `duration` ms unless their parent is closer to the
/// ideal zoom, in which case the parent fades out instead.
pub fn fade_values(
    tile: &Tile,
    parent: Option<&Tile>,
    source: &dyn SourceCache,
    duration: f64,
    transform: &dyn Transform,
    now: f64,
) -> FadeValues {
    if duration <= 0.0 {
        return FadeValues { opacity: 1.0, mix: 0.0 };
    }
    let since_tile = (now - tile.time_added) / duration;
    let since_parent = parent.map_or(-1.0, |p| (now - p.time_added) / duration);

    let ideal_z = f64::from(transform.covering_zoom_level(source.tile_size(), source.round_zoom()));
    let fade_in = parent.is_none_or(|p| {
        (f64::from(p.id.overscaled_z) - ideal_z).abs()
            > (f64::from(tile.id.overscaled_z) - ideal_z).abs()
    });
    let child = if fade_in { since_tile } else { 1.0 - since_parent }.clamp(0.0, 1.0) as f32;

    if parent.is_some() {
        FadeValues {
            opacity: 1.0,
            mix: 1.0 - child,
        }
    } else {
        FadeValues {
            opacity: child,
            mix: 0.0,
        }
    }
}

/// Hue rotation weights for `degrees`.
pub fn spin_weights(degrees: f32) -> [f32; 3] {
    let (s, c) = degrees.to_radians().sin_cos();
    let sqrt3 = 3f32.sqrt();
    [
        (2.0 * c + 1.0) / 3.0,
        (-sqrt3 * s - c + 1.0) / 3.0,
        (sqrt3 * s - c + 1.0) / 3.0,
    ]
}

pub fn contrast_factor(contrast: f32) -> f32 {
    if contrast > 0.0 {
        1.0 / (1.0 - contrast)
    } else {
        1.0 + contrast
    }
}

pub fn saturation_factor(saturation: f32) -> f32 {
    if saturation > 0.0 {
        1.0 - 1.0 / (1.001 - saturation)
    } else {
        -saturation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{Call, TextureFilter, UniformData};
    use crate::render::draw::test_support::*;
    use crate::source::{OverscaledTileId, StaticSourceCache};
    use crate::style::{LayerPaint, Style, StyleLayer};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn raster_style(source: StaticSourceCache, paint: RasterPaint) -> Style {
        let mut style = Style::new();
        style.add_source(Box::new(source));
        style.push_layer(StyleLayer::new("sat", Some("sat"), LayerPaint::Raster(paint)));
        style
    }

    #[test]
    fn color_adjustments_are_identity_by_default() {
        let w = spin_weights(0.0);
        assert!(approx(w[0], 1.0) && approx(w[1], 0.0) && approx(w[2], 0.0));
        assert_eq!(contrast_factor(0.0), 1.0);
        assert_eq!(contrast_factor(0.5), 2.0);
        assert_eq!(contrast_factor(-0.5), 0.5);
        assert_eq!(saturation_factor(0.0), 0.0);
        assert_eq!(saturation_factor(-0.25), 0.25);
        assert!(saturation_factor(0.5) < 0.0);
    }

    #[test]
    fn new_tile_without_parent_fades_in() {
        let mut painter = test_painter();
        let mut source = StaticSourceCache::new("sat", 512);
        let id = OverscaledTileId::canonical(2, 0, 0);
        source.add_tile(raster_tile(painter.context_mut(), id, 850.0));
        let mut style = raster_style(source, RasterPaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        let writes = painter.context().backend().uniform_writes("u_opacity");
        assert_eq!(writes, [UniformData::Float(0.5)]);
        let draws = draws_by_shader(&painter, "raster");
        assert_eq!(draws.len(), 1);
        assert!(!draws[0].stencil_test);
        assert_eq!(draws[0].depth_func, Some(CompareFunc::Less));
    }

    #[test]
    fn parent_texture_is_cross_faded() {
        let mut painter = test_painter();
        let mut source = StaticSourceCache::new("sat", 512);
        let child = OverscaledTileId::canonical(2, 1, 1);
        let parent = raster_tile(painter.context_mut(), OverscaledTileId::canonical(1, 0, 0), 0.0);
        let parent_texture = parent.raster_texture.map(|t| t.id);
        source.add_loaded_tile(parent);
        source.add_tile(raster_tile(painter.context_mut(), child, 850.0));
        let mut style = raster_style(source, RasterPaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        let backend = painter.context().backend();
        assert_eq!(backend.uniform_writes("u_tl_parent"), [UniformData::Vec2([0.5, 0.5])]);
        assert_eq!(backend.uniform_writes("u_scale_parent"), [UniformData::Float(0.5)]);
        assert_eq!(backend.uniform_writes("u_fade_t"), [UniformData::Float(0.5)]);
        assert!(backend.calls().iter().any(|c| matches!(
            c,
            Call::BindTexture(1, id, TextureFilter::Linear, _) if Some(*id) == parent_texture
        )));
    }

    #[test]
    fn mixed_zoom_tiles_use_overlap_stencil() {
        let mut painter = test_painter();
        let mut source = StaticSourceCache::new("sat", 512);
        let id = OverscaledTileId::canonical(1, 0, 0);
        source.add_tile(raster_tile(painter.context_mut(), id, 0.0));
        let id = OverscaledTileId::canonical(2, 3, 3);
        source.add_tile(raster_tile(painter.context_mut(), id, 0.0));
        let mut style = raster_style(source, RasterPaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        let draws = draws_by_shader(&painter, "raster");
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].stencil_func, Some((CompareFunc::GreaterEqual, 2, 0xFF)));
        assert_eq!(draws[1].stencil_func, Some((CompareFunc::GreaterEqual, 1, 0xFF)));
        // The higher zoom sits one sublayer nearer.
        assert!(draws[0].depth_range[1] < draws[1].depth_range[1]);
    }

    #[test]
    fn zero_duration_draws_fully_opaque() {
        let tile = Tile::new(OverscaledTileId::canonical(2, 0, 0), 512);
        let source = StaticSourceCache::new("sat", 512);
        let fade = fade_values(&tile, None, &source, 0.0, &FlatTransform::new(2.0), 10.0);
        assert_eq!(fade, FadeValues { opacity: 1.0, mix: 0.0 });
    }
}
