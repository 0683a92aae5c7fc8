use crate::color::Color;
use crate::error::Result;
use crate::gl::{
    Backend, ColorMode, CullFaceMode, DepthMask, DepthMode, Primitive, TextureFilter, TextureWrap,
    UniformValues,
};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, translate_pos_matrix};
use crate::render::pass::RenderPass;
use crate::render::pattern::pattern_uniforms;
use crate::source::Bucket;
use crate::style::FillPaint;

/// Polygon interiors, then their antialiased outlines.
///
/// Interiors go to the opaque pass when nothing about them blends; outlines
/// always draw translucent so their edges can fade.
pub fn draw_fill<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &FillPaint,
) -> Result<()> {
    if paint.opacity.constant_or(1.0) == 0.0 {
        return Ok(());
    }
    let color = painter.color_mode_for_render_pass(draw.pass());

    let opaque = draw.frame.opaque_pass_enabled_for_layer(draw.layer_index)
        && paint.pattern.is_none()
        && paint.color.constant_or(Color::TRANSPARENT).is_opaque()
        && paint.opacity.constant_or(0.0) == 1.0;
    let pass = if opaque { RenderPass::Opaque } else { RenderPass::Translucent };

    if draw.pass() == pass {
        let mask = if pass == RenderPass::Opaque {
            DepthMask::ReadWrite
        } else {
            DepthMask::ReadOnly
        };
        let depth = draw.depth_mode_for_sublayer(1, mask);
        draw_fill_tiles(painter, draw, paint, depth, color, false)?;
    }

    if draw.pass() == RenderPass::Translucent && paint.antialias {
        let sublayer = if paint.outline_color.is_some() { 2 } else { 0 };
        let depth = draw.depth_mode_for_sublayer(sublayer, DepthMask::ReadOnly);
        draw_fill_tiles(painter, draw, paint, depth, color, true)?;
    }
    Ok(())
}

fn draw_fill_tiles<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &FillPaint,
    depth: DepthMode,
    color: ColorMode,
    outline: bool,
) -> Result<()> {
    let Some(source) = draw.source else { return Ok(()) };
    let transform = draw.frame.transform;
    let pattern = paint.pattern.as_ref();

    let (shader, primitive) = match (outline, pattern.is_some()) {
        (false, true) => (ShaderId::FillPattern, Primitive::Triangles),
        (false, false) => (ShaderId::Fill, Primitive::Triangles),
        (true, true) if paint.outline_color.is_none() => {
            (ShaderId::FillOutlinePattern, Primitive::Lines)
        }
        (true, _) => (ShaderId::FillOutline, Primitive::Lines),
    };
    let buffer_size = draw.frame.options.drawing_buffer_size;
    let world = [buffer_size[0] as f32, buffer_size[1] as f32];
    let base_paint = paint.paint_uniforms();

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        if pattern.is_some() && !tile.patterns_loaded() {
            continue;
        }
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_fill) else { continue };

        let mut paint_values = base_paint.clone();
        let mut atlas_size = [1, 1];
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
            atlas_size = texture.size;
            paint_values.set("u_pattern_from", from.tlbr());
            paint_values.set("u_pattern_to", to.tlbr());
        }

        let matrix = translate_pos_matrix(
            transform,
            &draw.pos_matrix(coord),
            coord,
            tile.tile_size,
            paint.translate,
            paint.translate_anchor,
            false,
        );
        let mut uniforms = UniformValues::new().with("u_matrix", matrix);
        if outline {
            uniforms.set("u_world", world);
        }
        if shader == ShaderId::FillPattern || shader == ShaderId::FillOutlinePattern {
            uniforms.extend(&pattern_uniforms(
                &draw.frame.crossfade,
                painter.config.pixel_ratio,
                coord,
                tile.tile_size,
                transform.tile_zoom(),
                atlas_size,
            ));
        }

        let (index_buffer, segments) = if outline {
            (&bucket.outline_index_buffer, bucket.outline_segments.as_slice())
        } else {
            (&bucket.geometry.index_buffer, bucket.geometry.segments.as_slice())
        };

        let stencil = painter.stencil_mode_for_clipping(coord);
        painter.draw_program(
            shader,
            DrawCall {
                primitive,
                depth,
                stencil,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms: &uniforms,
                configuration: Some(&bucket.configuration),
                paint: Some(&paint_values),
                zoom: transform.zoom(),
                layout_vertex_buffer: &bucket.geometry.layout_vertex_buffer,
                index_buffer,
                segments,
                extra_vertex_buffers: &[],
            },
        )?;
    }
    Ok(())
}
