use crate::error::Result;
use crate::gl::{
    Backend, CullFaceMode, DepthMask, Primitive, TextureFilter, TextureWrap, UniformValues,
};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, translate_pos_matrix};
use crate::render::pass::RenderPass;
use crate::render::pattern::pixels_to_tile_units;
use crate::source::Bucket;
use crate::style::LinePaint;

pub fn draw_line<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &LinePaint,
) -> Result<()> {
    if draw.pass() != RenderPass::Translucent {
        return Ok(());
    }
    if paint.opacity.constant_or(1.0) == 0.0 || paint.width.constant_or(1.0) == 0.0 {
        return Ok(());
    }
    let Some(source) = draw.source else { return Ok(()) };

    let depth = draw.depth_mode_for_sublayer(0, DepthMask::ReadOnly);
    let color = painter.color_mode_for_render_pass(draw.pass());
    let transform = draw.frame.transform;
    let pattern = paint.pattern.as_ref();
    let shader = if pattern.is_some() { ShaderId::LinePattern } else { ShaderId::Line };

    let [gl_x, gl_y] = transform.pixels_to_gl_units();
    let units_to_pixels = [1.0 / gl_x, 1.0 / gl_y];
    let base_paint = paint.paint_uniforms();

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        if pattern.is_some() && !tile.patterns_loaded() {
            continue;
        }
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_line) else { continue };

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
            .with(
                "u_ratio",
                1.0 / pixels_to_tile_units(coord, tile.tile_size, 1.0, transform.zoom()),
            )
            .with("u_device_pixel_ratio", painter.config.pixel_ratio)
            .with("u_units_to_pixels", units_to_pixels);

        let mut paint_values = base_paint.clone();
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
            let crossfade = &draw.frame.crossfade;
            let tile_ratio =
                1.0 / pixels_to_tile_units(coord, tile.tile_size, 1.0, transform.tile_zoom());
            uniforms.set("u_texsize", [texture.size[0] as f32, texture.size[1] as f32]);
            uniforms.set("u_image", 0_i32);
            uniforms.set("u_scale", [tile_ratio, crossfade.from_scale, crossfade.to_scale]);
            uniforms.set("u_fade", crossfade.t);
        }

        let stencil = painter.stencil_mode_for_clipping(coord);
        painter.draw_program(
            shader,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil,
                color,
                cull: CullFaceMode::DISABLED,
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
    use crate::gl::UniformData;
    use crate::render::draw::test_support::*;
    use crate::source::OverscaledTileId;
    use crate::style::{CrossFaded, LayerPaint, PropertyValue, Style, StyleLayer};

    fn setup(paint: LinePaint) -> (crate::render::Painter<crate::gl::RecordingBackend>, Style) {
        let mut painter = test_painter();
        let mut style = Style::new();
        let tiles = [OverscaledTileId::canonical(3, 1, 1)];
        add_source(&mut painter, &mut style, "v", "roads", &tiles, line_bucket);
        style.push_layer(StyleLayer::new("roads", Some("v"), LayerPaint::Line(paint)));
        (painter, style)
    }

    #[test]
    fn lines_draw_translucent_with_ratio() {
        let (mut painter, mut style) = setup(LinePaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(3.0));

        let draws = draws_by_shader(&painter, "line");
        assert_eq!(draws.len(), 1);
        assert!(!draws[0].depth_mask);
        let ratio = painter.context().backend().uniform_writes("u_ratio");
        assert_eq!(ratio, [UniformData::Float(1.0 / 16.0)]);
    }

    #[test]
    fn zero_width_skips() {
        let (mut painter, mut style) = setup(LinePaint {
            width: PropertyValue::Constant(0.0),
            ..LinePaint::default()
        });
        render(&mut painter, &mut style, &FlatTransform::new(3.0));
        assert!(draws_by_shader(&painter, "line").is_empty());
    }

    #[test]
    fn map_translate_offsets_matrix_in_tile_units() {
        let (mut painter, mut style) = setup(LinePaint {
            translate: [2.0, 0.0],
            ..LinePaint::default()
        });
        render(&mut painter, &mut style, &FlatTransform::new(3.0));
        let matrices = painter.context().backend().uniform_writes("u_matrix");
        let line_matrix = matrices.last().copied();
        let Some(UniformData::Mat4(m)) = line_matrix else { panic!("no matrix") };
        let base = FlatTransform::new(3.0).tile_matrix(&OverscaledTileId::canonical(3, 1, 1));
        assert_eq!(m[12] - base[12], 32.0);
    }

    fn pattern_setup(
        atlas: &[&str]) -> (crate::render::Painter<crate::gl::RecordingBackend>, Style,
    ) {
        let mut painter = test_painter();
        let mut style = Style::new();
        let tiles = [OverscaledTileId::canonical(3, 1, 1)];
        add_source(&mut painter, &mut style, "v", "roads", &tiles, |ctx| {
            with_pattern_binder(line_bucket(ctx))
        });
        style.push_layer(StyleLayer::new(
            "roads",
            Some("v"),
            LayerPaint::Line(LinePaint {
                pattern: Some(CrossFaded::same("dash".to_owned())),
                ..LinePaint::default()
            }),
        ));
        with_pattern_atlas(&mut style, "v", atlas);
        (painter, style)
    }

    #[test]
    fn pattern_lines_draw_when_atlas_holds_the_image() {
        let (mut painter, mut style) = pattern_setup(&["dash"]);
        render(&mut painter, &mut style, &FlatTransform::new(3.0));
        assert_eq!(draws_by_shader(&painter, "line_pattern").len(), 1);
        assert_eq!(painter.context().backend().uniform_writes("u_pattern_to").len(), 1);
    }

    #[test]
    fn pattern_lines_skip_tiles_without_the_image() {
        let (mut painter, mut style) = pattern_setup(&["dots"]);
        render(&mut painter, &mut style, &FlatTransform::new(3.0));
        assert!(draws_by_shader(&painter, "line_pattern").is_empty());
    }
}
