use crate::error::Result;
use crate::gl::{
    Backend, ColorMode, CompareFunc, CullFaceMode, DepthMask, DepthMode, Primitive, StencilMode,
    TextureFilter,
    TextureWrap, UniformValues,
};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, translate_pos_matrix};
use crate::render::pass::RenderPass;
use crate::render::pattern::{pattern_uniforms, pixels_to_tile_units};
use crate::source::Bucket;
use crate::style::FillExtrusionPaint;

/// Extruded polygons, depth tested against each other.
///
/// Opaque extrusions draw in one pass. Translucent or patterned ones first
/// fill the depth buffer without color, then draw only the nearest faces, each
/// pixel at most once.
pub fn draw_fill_extrusion<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &FillExtrusionPaint,
) -> Result<()> {
    if paint.opacity == 0.0 || draw.pass() != RenderPass::Translucent {
        return Ok(());
    }
    let depth = DepthMode::new(
        CompareFunc::LessEqual,
        DepthMask::ReadWrite,
        draw.frame.depth.range_for_3d(),
    );
    let color = painter.color_mode_for_render_pass(draw.pass());

    if paint.opacity == 1.0 && paint.pattern.is_none() {
        draw_extrusion_tiles(painter, draw, paint, depth, StencilMode::DISABLED, color)
    } else {
        draw_extrusion_tiles(
            painter,
            draw,
            paint,
            depth,
            StencilMode::DISABLED,
            ColorMode::DISABLED,
        )?;
        let stencil = painter.stencil_mode_for_3d();
        draw_extrusion_tiles(painter, draw, paint, depth, stencil, color)
    }
}

fn draw_extrusion_tiles<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &FillExtrusionPaint,
    depth: DepthMode,
    stencil: StencilMode,
    color: ColorMode,
) -> Result<()> {
    let Some(source) = draw.source else { return Ok(()) };
    let transform = draw.frame.transform;
    let light = draw.frame.light;
    let pattern = paint.pattern.as_ref();
    let shader = if pattern.is_some() {
        ShaderId::FillExtrusionPattern
    } else {
        ShaderId::FillExtrusion
    };
    let base_paint = paint.paint_uniforms();

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        if pattern.is_some() && !tile.patterns_loaded() {
            continue;
        }
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_fill_extrusion) else {
            continue;
        };

        let mut paint_values = base_paint.clone();
        let matrix = translate_pos_matrix(
            transform,
            &draw.pos_matrix(coord),
            coord,
            tile.tile_size,
            paint.translate,
            paint.translate_anchor,
            false,
        );
        let mut uniforms = UniformValues::new()
            .with("u_matrix", matrix)
            .with("u_lightpos", light.direction(transform.angle()))
            .with("u_lightintensity", light.intensity)
            .with("u_lightcolor", light.color.to_rgb())
            .with("u_vertical_gradient", if paint.vertical_gradient { 1.0 } else { 0.0 })
            .with("u_opacity", paint.opacity);

        if let Some(pattern) = pattern {
            let Some(texture) = tile.image_atlas_texture else { continue };
            let Some(atlas) = &tile.image_atlas else { continue };
            let (Some(from), Some(to)) =
                (atlas.pattern_position(&pattern.from), atlas.pattern_position(&pattern.to))
            else {
                continue;
            };
            painter
                .context
                .bind_texture(0, &texture, TextureFilter::Linear, TextureWrap::Clamp);
            paint_values.set("u_pattern_from", from.tlbr());
            paint_values.set("u_pattern_to", to.tlbr());
            let tile_zoom = transform.tile_zoom();
            let tile_ratio = 1.0 / pixels_to_tile_units(coord, tile.tile_size, 1.0, tile_zoom);
            uniforms.extend(&pattern_uniforms(
                &draw.frame.crossfade,
                painter.config.pixel_ratio,
                coord,
                tile.tile_size,
                tile_zoom,
                texture.size,
            ));
            uniforms.set(
                "u_height_factor",
                -(2f32.powi(i32::from(coord.overscaled_z))) / tile_ratio / 8.0,
            );
        }

        painter.draw_program(
            shader,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil,
                color,
                cull: CullFaceMode::BACK_CCW,
                uniforms: &uniforms,
                configuration: Some(&bucket.configuration),
                paint: Some(&paint_values),
                zoom: transform.zoom(),
                layout_vertex_buffer: &bucket.geometry.layout_vertex_buffer,
                index_buffer: &bucket.geometry.index_buffer,
                segments: &bucket.geometry.segments,
                extra_vertex_buffers: &[],
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{Call, ColorMask};
    use crate::render::draw::test_support::*;
    use crate::source::OverscaledTileId;
    use crate::style::{CrossFaded, LayerPaint, Style, StyleLayer};

    fn setup(
        paint: FillExtrusionPaint) -> (crate::render::Painter<crate::gl::RecordingBackend>, Style,
    ) {
        let mut painter = test_painter();
        let mut style = Style::new();
        let tiles = [OverscaledTileId::canonical(2, 0, 0)];
        add_source(&mut painter, &mut style, "v", "buildings", &tiles, extrusion_bucket);
        style.push_layer(StyleLayer::new("buildings", Some("v"), LayerPaint::FillExtrusion(paint)));
        (painter, style)
    }

    #[test]
    fn opaque_extrusions_draw_once() {
        let (mut painter, mut style) = setup(FillExtrusionPaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let draws = draws_by_shader(&painter, "fill_extrusion");
        assert_eq!(draws.len(), 1);
        assert!(draws[0].depth_mask);
        assert_eq!(draws[0].depth_func, Some(CompareFunc::LessEqual));
        assert!(!draws[0].stencil_test);
    }

    #[test]
    fn translucent_extrusions_prime_depth_then_draw_once_per_pixel() {
        let (mut painter, mut style) = setup(FillExtrusionPaint {
            opacity: 0.5,
            ..FillExtrusionPaint::default()
        });
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let draws = draws_by_shader(&painter, "fill_extrusion");
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].color_mask, ColorMask::NONE);
        assert!(draws[1].stencil_test);
        assert_eq!(draws[1].stencil_func, Some((CompareFunc::NotEqual, 1, 0xFF)));

        let calls = painter.context().backend().calls();
        assert!(calls.iter().any(|c| matches!(c, Call::CullFace(true))));
    }

    #[test]
    fn extrusions_use_the_shared_3d_depth_range() {
        let (mut painter, mut style) = setup(FillExtrusionPaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let draws = draws_by_shader(&painter, "fill_extrusion");
        assert_eq!(draws[0].depth_range[0], 0.0);
        assert!(draws[0].depth_range[1] < 1.0);
    }

    fn pattern_setup(
        atlas: &[&str]) -> (crate::render::Painter<crate::gl::RecordingBackend>, Style,
    ) {
        let mut painter = test_painter();
        let mut style = Style::new();
        let tiles = [OverscaledTileId::canonical(2, 0, 0)];
        add_source(&mut painter, &mut style, "v", "buildings", &tiles, |ctx| {
            with_pattern_binder(extrusion_bucket(ctx))
        });
        let paint = FillExtrusionPaint {
            pattern: Some(CrossFaded::same("brick".to_owned())),
            ..FillExtrusionPaint::default()
        };
        style.push_layer(StyleLayer::new("buildings", Some("v"), LayerPaint::FillExtrusion(paint)));
        with_pattern_atlas(&mut style, "v", atlas);
        (painter, style)
    }

    #[test]
    fn patterned_extrusions_draw_both_passes() {
        let (mut painter, mut style) = pattern_setup(&["brick"]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        assert_eq!(draws_by_shader(&painter, "fill_extrusion_pattern").len(), 2);
    }

    #[test]
    fn patterned_extrusions_skip_tiles_without_the_image() {
        let (mut painter, mut style) = pattern_setup(&["tile"]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        assert!(draws_by_shader(&painter, "fill_extrusion_pattern").is_empty());
        assert!(painter.context().backend().uniform_writes("u_pattern_from").is_empty());
    }

    #[test]
    fn patterned_extrusions_wait_for_tile_patterns() {
        let (mut painter, mut style) = pattern_setup(&["brick"]);
        set_patterns_loaded(&mut style, "v", false);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        assert!(draws_by_shader(&painter, "fill_extrusion_pattern").is_empty());
    }
}
