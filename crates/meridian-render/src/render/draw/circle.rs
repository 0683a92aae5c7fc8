use crate::error::Result;
use crate::gl::{Backend, CullFaceMode, DepthMask, Primitive, StencilMode, UniformValues};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, translate_pos_matrix};
use crate::render::pass::RenderPass;
use crate::render::pattern::pixels_to_tile_units;
use crate::render::sort_key::{push_segments, sort_by_key};
use crate::source::{Bucket, GeometryBucket};
use crate::style::{Alignment, CirclePaint};

/// Circles are unclipped: they may overhang tile edges.
pub fn draw_circles<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &CirclePaint,
) -> Result<()> {
    if draw.pass() != RenderPass::Translucent {
        return Ok(());
    }
    if paint.opacity.constant_or(1.0) == 0.0
        && (paint.stroke_width.constant_or(1.0) == 0.0
            || paint.stroke_opacity.constant_or(1.0) == 0.0)
    {
        return Ok(());
    }
    let Some(source) = draw.source else { return Ok(()) };

    let depth = draw.depth_mode_for_sublayer(0, DepthMask::ReadOnly);
    let color = painter.color_mode_for_render_pass(draw.pass());
    let transform = draw.frame.transform;
    let paint_values = paint.paint_uniforms();

    let mut tiles: Vec<(&GeometryBucket, UniformValues)> = Vec::new();
    let mut states = Vec::new();
    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_circle) else {
            continue;
        };

        let (pitch_with_map, extrude_scale) = if paint.pitch_alignment == Alignment::Map {
            let ratio = pixels_to_tile_units(coord, tile.tile_size, 1.0, transform.zoom());
            (true, [ratio, ratio])
        } else {
            (false, transform.pixels_to_gl_units())
        };
        let matrix = translate_pos_matrix(
            transform,
            &draw.pos_matrix(coord),
            coord,
            tile.tile_size,
            paint.translate,
            paint.translate_anchor,
            false,
        );
        let uniforms = UniformValues::new()
            .with("u_camera_to_center_distance", transform.camera_to_center_distance())
            .with("u_scale_with_map", i32::from(paint.pitch_scale == Alignment::Map))
            .with("u_matrix", matrix)
            .with("u_pitch_with_map", i32::from(pitch_with_map))
            .with("u_device_pixel_ratio", painter.config.pixel_ratio)
            .with("u_extrude_scale", extrude_scale);

        push_segments(&mut states, tiles.len(), &bucket.geometry.segments, paint.sort_key);
        tiles.push((bucket, uniforms));
    }
    if paint.sort_key {
        sort_by_key(&mut states);
    }

    for state in &states {
        let (bucket, uniforms) = &tiles[state.state];
        painter.draw_program(
            ShaderId::Circle,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil: StencilMode::DISABLED,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms,
                configuration: Some(&bucket.configuration),
                paint: Some(&paint_values),
                zoom: transform.zoom(),
                layout_vertex_buffer: &bucket.geometry.layout_vertex_buffer,
                index_buffer: &bucket.geometry.index_buffer,
                segments: state.segments,
                extra_vertex_buffers: &[],
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::RecordingBackend;
    use crate::render::draw::test_support::*;
    use crate::source::OverscaledTileId;
    use crate::style::{LayerPaint, PropertyValue, Style, StyleLayer};

    fn style(painter: &mut crate::render::Painter<RecordingBackend>, paint: CirclePaint) -> Style {
        let mut style = Style::new();
        let t1 = OverscaledTileId::canonical(2, 0, 0);
        let t2 = OverscaledTileId::canonical(2, 1, 0);
        let b1 = circle_bucket(painter.context_mut(), &[5.0, 1.0]);
        let b2 = circle_bucket(painter.context_mut(), &[3.0, 2.0]);
        add_source_with(&mut style, "pts", "poi", vec![(t1, b1), (t2, b2)]);
        style.push_layer(StyleLayer::new("poi", Some("pts"), LayerPaint::Circle(paint)));
        style
    }

    #[test]
    fn sort_key_interleaves_features_across_tiles() {
        let mut painter = test_painter();
        let mut style = style(&mut painter, CirclePaint {
            sort_key: true,
            ..CirclePaint::default()
        });
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        // Each keyed segment starts at primitive `key`, so the draw order
        // reads back as the key order.
        let order: Vec<u32> = draws_by_shader(&painter, "circle")
            .iter()
            .map(|d| d.first_index / 3)
            .collect();
        assert_eq!(order, [1, 2, 3, 5]);
    }

    #[test]
    fn without_sort_key_one_draw_per_segment_in_tile_order() {
        let mut painter = test_painter();
        let mut style = style(&mut painter, CirclePaint::default());
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let draws = draws_by_shader(&painter, "circle");
        assert_eq!(draws.len(), 4);
        assert!(draws.iter().all(|d| !d.stencil_test));
    }

    #[test]
    fn invisible_circles_skip() {
        let mut painter = test_painter();
        let mut style = style(&mut painter, CirclePaint {
            opacity: PropertyValue::Constant(0.0),
            stroke_width: PropertyValue::Constant(0.0),
            ..CirclePaint::default()
        });
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        assert!(draws_by_shader(&painter, "circle").is_empty());
    }
}
