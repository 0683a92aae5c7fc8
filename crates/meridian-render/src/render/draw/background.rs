use crate::error::Result;
use crate::gl::{Backend, CullFaceMode, DepthMask, Primitive, StencilMode, UniformValues};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter};
use crate::render::pass::RenderPass;
use crate::render::pattern::background_pattern_uniforms;
use crate::style::BackgroundPaint;

const TILE_SIZE: u32 = 512;

/// Fills every covering tile with a color or a pattern from the shared atlas.
pub fn draw_background<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &BackgroundPaint,
) -> Result<()> {
    if paint.opacity == 0.0 {
        return Ok(());
    }

    let pattern = match &paint.pattern {
        Some(image) => {
            let from = painter.image_manager.get_pattern(&image.from);
            let to = painter.image_manager.get_pattern(&image.to);
            match (from, to) {
                (Some(from), Some(to)) => Some((from, to)),
                _ => return Ok(()),
            }
        }
        None => None,
    };

    let opaque = pattern.is_none()
        && paint.color.is_opaque()
        && paint.opacity == 1.0
        && draw.frame.opaque_pass_enabled_for_layer(draw.layer_index);
    let pass = if opaque { RenderPass::Opaque } else { RenderPass::Translucent };
    if draw.pass() != pass {
        return Ok(());
    }

    let depth = draw.depth_mode_for_sublayer(
        0,
        if opaque { DepthMask::ReadWrite } else { DepthMask::ReadOnly },
    );
    let color = painter.color_mode_for_render_pass(pass);
    let buffers = painter.ensure_buffers();
    let transform = draw.frame.transform;
    let tile_zoom = transform.tile_zoom();

    if pattern.is_some() {
        painter.image_manager.bind(&mut painter.context, 0);
    }
    let atlas_size = painter.image_manager.pixel_size();

    for tile in transform.covering_tiles(TILE_SIZE) {
        let matrix = transform.pos_matrix(&tile.to_unwrapped(), false);
        let mut uniforms = UniformValues::new()
            .with("u_matrix", matrix)
            .with("u_opacity", paint.opacity);
        let shader = match &pattern {
            Some((from, to)) => {
                uniforms.extend(&background_pattern_uniforms(
                    from,
                    to,
                    &draw.frame.crossfade,
                    atlas_size,
                    &tile,
                    TILE_SIZE,
                    tile_zoom,
                ));
                ShaderId::BackgroundPattern
            }
            None => {
                uniforms.set("u_color", paint.color);
                ShaderId::Background
            }
        };

        painter.draw_program(
            shader,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil: StencilMode::DISABLED,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms: &uniforms,
                configuration: None,
                paint: None,
                zoom: transform.zoom(),
                layout_vertex_buffer: &buffers.tile_extent,
                index_buffer: &buffers.quad_indices,
                segments: &buffers.quad_segments,
                extra_vertex_buffers: &[],
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::gl::{Call, TextureFilter, TextureWrap};
    use crate::render::draw::test_support::*;
    use crate::style::{CrossFaded, LayerPaint, Style, StyleLayer};

    fn layer(paint: BackgroundPaint) -> StyleLayer {
        StyleLayer::new("bg", None, LayerPaint::Background(paint))
    }

    #[test]
    fn opaque_color_draws_in_opaque_pass_only() {
        let mut style = Style::new();
        style.push_layer(layer(BackgroundPaint::default()));
        let mut painter = test_painter();
        render(&mut painter, &mut style, &FlatTransform::with_tiles(2));

        let draws = draws_by_shader(&painter, "background");
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|d| d.depth_mask));
    }

    #[test]
    fn translucent_color_writes_no_depth() {
        let mut style = Style::new();
        style.push_layer(layer(BackgroundPaint {
            color: Color::from_straight(1.0, 0.0, 0.0, 0.5),
            ..BackgroundPaint::default()
        }));
        let mut painter = test_painter();
        render(&mut painter, &mut style, &FlatTransform::with_tiles(1));

        let draws = draws_by_shader(&painter, "background");
        assert_eq!(draws.len(), 1);
        assert!(!draws[0].depth_mask);
    }

    #[test]
    fn missing_pattern_skips_layer() {
        let mut style = Style::new();
        style.push_layer(layer(BackgroundPaint {
            pattern: Some(CrossFaded::same("nope".to_owned())),
            ..BackgroundPaint::default()
        }));
        let mut painter = test_painter();
        render(&mut painter, &mut style, &FlatTransform::with_tiles(1));
        assert!(draws_by_shader(&painter, "background_pattern").is_empty());
    }

    #[test]
    fn pattern_binds_shared_atlas() {
        let mut style = Style::new();
        style.push_layer(layer(BackgroundPaint {
            pattern: Some(CrossFaded::same("dots".to_owned())),
            ..BackgroundPaint::default()
        }));
        let mut painter = test_painter();
        painter.image_manager_mut().add_image("dots", solid_image(4, 4));
        render(&mut painter, &mut style, &FlatTransform::with_tiles(1));

        assert_eq!(draws_by_shader(&painter, "background_pattern").len(), 1);
        let backend = painter.context().backend();
        assert!(
            backend
                .calls()
                .iter()
                .any(|c| matches!(
                    c,
                    Call::BindTexture(0, _, TextureFilter::Linear, TextureWrap::Clamp)
                ))
        );
        assert_eq!(backend.uniform_writes("u_pattern_size_a").len(), 1);
    }
}
