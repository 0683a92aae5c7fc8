use crate::error::Result;
use crate::gl::{
    Backend, ColorMode, CullFaceMode, DepthMask, DepthMode, Mat4, Primitive, Segment, StencilMode,
    Texture,
    TextureFilter, TextureWrap, UniformValues,
};
use crate::math::{mat4_identity, mat4_multiply, mat4_rotate_z, mat4_scale};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, translate_pos_matrix};
use crate::render::pass::RenderPass;
use crate::render::pattern::pixels_to_tile_units;
use crate::render::sort_key::{push_segments, sort_by_key};
use crate::source::{Bucket, SymbolBuffers};
use crate::style::{Alignment, SymbolPaint, SymbolPartPaint};
use crate::transform::Transform;

/// Icons first, then text, then collision boxes when enabled.
pub fn draw_symbols<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &SymbolPaint,
) -> Result<()> {
    if draw.pass() != RenderPass::Translucent {
        return Ok(());
    }
    let color = painter.color_mode_for_render_pass(draw.pass());

    if paint.icon.opacity.constant_or(1.0) != 0.0 {
        draw_layer_symbols(painter, draw, paint, &paint.icon, false, color)?;
    }
    if paint.text.opacity.constant_or(1.0) != 0.0 {
        draw_layer_symbols(painter, draw, paint, &paint.text, true, color)?;
    }
    if painter.config.show_collision_boxes {
        draw_collision_debug(painter, draw, &paint.text)?;
    }
    Ok(())
}

struct TileState<'a> {
    buffers: &'a SymbolBuffers,
    uniforms: UniformValues,
    texture: Texture,
    filter: TextureFilter,
    sdf: bool,
    halo: bool,
}

fn draw_layer_symbols<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    layer_paint: &SymbolPaint,
    paint: &SymbolPartPaint,
    is_text: bool,
    color: ColorMode,
) -> Result<()> {
    let Some(source) = draw.source else { return Ok(()) };
    let transform = draw.frame.transform;
    let options = draw.frame.options;

    let rotate_with_map = paint.rotation_alignment == Alignment::Map;
    let pitch_with_map = paint.pitch_alignment == Alignment::Map;
    let along_line = rotate_with_map && layer_paint.line_placement;
    let rotate_in_shader = rotate_with_map && !pitch_with_map && !along_line;
    let depth = draw.depth_mode_for_sublayer(0, DepthMask::ReadOnly);
    let fade_change = if painter.config.fade_duration > 0.0 {
        options.symbol_fade_change
    } else {
        1.0
    };

    let mut tiles: Vec<TileState<'_>> = Vec::new();
    let mut states = Vec::new();
    let mut sort_features = false;

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_symbol) else {
            continue;
        };
        let buffers = if is_text { &bucket.text } else { &bucket.icon };
        let Some(buffers) = buffers.as_ref() else { continue };
        if buffers.geometry.segments.is_empty() {
            continue;
        }

        let sdf = is_text || bucket.sdf_icons;
        let transformed = pitch_with_map || transform.pitch() != 0.0;
        let (texture, filter) = if is_text {
            let Some(texture) = tile.glyph_atlas_texture else { continue };
            (texture, TextureFilter::Linear)
        } else {
            let Some(texture) = tile.image_atlas_texture else { continue };
            let scaled = paint.size.constant_or(0.0) != 1.0 || bucket.icons_need_linear;
            let linear = sdf || options.rotating || options.zooming || scaled || transformed;
            (texture, if linear { TextureFilter::Linear } else { TextureFilter::Nearest })
        };

        let pos_matrix = draw.pos_matrix(coord);
        let s = pixels_to_tile_units(coord, tile.tile_size, 1.0, transform.zoom());
        let label_plane =
            label_plane_matrix(transform, &pos_matrix, pitch_with_map, rotate_with_map, s);
        let gl_coord = gl_coord_matrix(transform, &pos_matrix, pitch_with_map, rotate_with_map, s);
        let label_plane = if along_line { mat4_identity() } else { label_plane };
        let coord_matrix = translate_pos_matrix(
            transform,
            &gl_coord,
            coord,
            tile.tile_size,
            paint.translate,
            paint.translate_anchor,
            true,
        );

        let size = buffers.size;
        let (size_t, size_value) = size.evaluate(transform.zoom());
        let [width, height] = transform.size();
        let mut uniforms = UniformValues::new()
            .with("u_is_size_zoom_constant", i32::from(size.is_zoom_constant()))
            .with("u_is_size_feature_constant", i32::from(size.is_feature_constant()))
            .with("u_size_t", size_t)
            .with("u_size", size_value)
            .with("u_camera_to_center_distance", transform.camera_to_center_distance())
            .with("u_pitch", transform.pitch())
            .with("u_rotate_symbol", i32::from(rotate_in_shader))
            .with("u_aspect_ratio", width / height)
            .with("u_fade_change", fade_change)
            .with("u_matrix", pos_matrix)
            .with("u_label_plane_matrix", label_plane)
            .with("u_coord_matrix", coord_matrix)
            .with("u_is_text", i32::from(is_text))
            .with("u_pitch_with_map", i32::from(pitch_with_map))
            .with("u_texsize", [texture.size[0] as f32, texture.size[1] as f32])
            .with("u_texture", 0_i32);
        if sdf {
            let gamma_scale = if pitch_with_map {
                transform.pitch().cos() * transform.camera_to_center_distance()
            } else {
                1.0
            };
            uniforms.set("u_gamma_scale", gamma_scale);
            uniforms.set("u_device_pixel_ratio", painter.config.pixel_ratio);
            uniforms.set("u_is_halo", 0_i32);
        }

        let by_key = layer_paint.sort_key && bucket.can_overlap;
        sort_features |= by_key;
        push_segments(&mut states, tiles.len(), &buffers.geometry.segments, by_key);
        tiles.push(TileState {
            buffers,
            uniforms,
            texture,
            filter,
            sdf,
            halo: sdf && paint.halo_width.constant_or(1.0) != 0.0,
        });
    }
    if sort_features {
        sort_by_key(&mut states);
    }

    let paint_values = paint.paint_uniforms();
    for state in &states {
        let tile = &mut tiles[state.state];
        painter
            .context
            .bind_texture(0, &tile.texture, tile.filter, TextureWrap::Clamp);
        let shader = if tile.sdf { ShaderId::SymbolSdf } else { ShaderId::SymbolIcon };

        if tile.halo {
            tile.uniforms.set("u_is_halo", 1_i32);
            draw_symbol_elements(
                painter,
                draw,
                shader,
                tile,
                state.segments,
                depth,
                color,
                &paint_values,
            )?;
            tile.uniforms.set("u_is_halo", 0_i32);
        }
        draw_symbol_elements(
            painter,
            draw,
            shader,
            tile,
            state.segments,
            depth,
            color,
            &paint_values,
        )?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_symbol_elements<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    shader: ShaderId,
    tile: &TileState<'_>,
    segments: &[Segment],
    depth: DepthMode,
    color: ColorMode,
    paint: &UniformValues,
) -> Result<()> {
    let buffers = tile.buffers;
    let extra = [buffers.dynamic_layout_vertex_buffer, buffers.opacity_vertex_buffer];
    painter.draw_program(
        shader,
        DrawCall {
            primitive: Primitive::Triangles,
            depth,
            stencil: StencilMode::DISABLED,
            color,
            cull: CullFaceMode::DISABLED,
            uniforms: &tile.uniforms,
            configuration: Some(&buffers.configuration),
            paint: Some(paint),
            zoom: draw.frame.transform.zoom(),
            layout_vertex_buffer: &buffers.geometry.layout_vertex_buffer,
            index_buffer: &buffers.geometry.index_buffer,
            segments,
            extra_vertex_buffers: &extra,
        },
    )
}

/// Placement boxes as lines, for debugging label collisions.
fn draw_collision_debug<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &SymbolPartPaint,
) -> Result<()> {
    let Some(source) = draw.source else { return Ok(()) };
    let transform = draw.frame.transform;
    let color = painter.color_mode_for_render_pass(draw.pass());
    let [gl_x, gl_y] = transform.pixels_to_gl_units();

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        let Some(bucket) = tile.bucket(&draw.layer.id).and_then(Bucket::as_symbol) else {
            continue;
        };
        let Some(boxes) = &bucket.collision_box else { continue };

        let matrix = translate_pos_matrix(
            transform,
            &draw.pos_matrix(coord),
            coord,
            tile.tile_size,
            paint.translate,
            paint.translate_anchor,
            false,
        );
        let pixel_ratio = pixels_to_tile_units(coord, tile.tile_size, 1.0, transform.zoom());
        let scale = 2f32.powf(transform.zoom() - f32::from(coord.overscaled_z));
        let uniforms = UniformValues::new()
            .with("u_matrix", matrix)
            .with("u_camera_to_center_distance", transform.camera_to_center_distance())
            .with("u_pixels_to_tile_units", pixel_ratio)
            .with(
                "u_extrude_scale",
                [gl_x / (pixel_ratio * scale), gl_y / (pixel_ratio * scale)],
            )
            .with("u_overscale_factor", coord.overscale_factor());

        let extra = [boxes.dynamic_vertex_buffer];
        painter.draw_program(
            ShaderId::CollisionBox,
            DrawCall {
                primitive: Primitive::Lines,
                depth: DepthMode::DISABLED,
                stencil: StencilMode::DISABLED,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms: &uniforms,
                configuration: None,
                paint: None,
                zoom: transform.zoom(),
                layout_vertex_buffer: &boxes.geometry.layout_vertex_buffer,
                index_buffer: &boxes.geometry.index_buffer,
                segments: &boxes.geometry.segments,
                extra_vertex_buffers: &extra,
            },
        )?;
    }
    Ok(())
}

/// Tile units to the plane labels are laid out in.
fn label_plane_matrix(
    transform: &dyn Transform,
    pos_matrix: &Mat4,
    pitch_with_map: bool,
    rotate_with_map: bool,
    pixels_to_tile_units: f32,
) -> Mat4 {
    if pitch_with_map {
        let s = 1.0 / pixels_to_tile_units;
        let m = mat4_scale(&mat4_identity(), [s, s, 1.0]);
        if rotate_with_map { m } else { mat4_rotate_z(&m, transform.angle()) }
    } else {
        mat4_multiply(&transform.label_plane_matrix(), pos_matrix)
    }
}

/// Label plane back to clip space.
fn gl_coord_matrix(
    transform: &dyn Transform,
    pos_matrix: &Mat4,
    pitch_with_map: bool,
    rotate_with_map: bool,
    pixels_to_tile_units: f32,
) -> Mat4 {
    if pitch_with_map {
        let m = mat4_scale(pos_matrix, [pixels_to_tile_units, pixels_to_tile_units, 1.0]);
        if rotate_with_map { m } else { mat4_rotate_z(&m, -transform.angle()) }
    } else {
        transform.gl_coord_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::gl::{Call, UniformData};
    use crate::render::draw::test_support::*;
    use crate::source::OverscaledTileId;
    use crate::style::{LayerPaint, PropertyValue, Style, StyleLayer};

    fn setup(
        config: RenderConfig,
        paint: SymbolPaint,
        keys: [&[f32]; 2]) -> (crate::render::Painter<crate::gl::RecordingBackend>, Style,
    ) {
        let mut painter = test_painter_with(config);
        let mut style = Style::new();
        let t1 = OverscaledTileId::canonical(2, 0, 0);
        let t2 = OverscaledTileId::canonical(2, 1, 0);
        let b1 = symbol_bucket(painter.context_mut(), keys[0]);
        let b2 = symbol_bucket(painter.context_mut(), keys[1]);
        add_source_with(&mut style, "v", "labels", vec![(t1, b1), (t2, b2)]);
        with_symbol_textures(painter.context_mut(), &mut style, "v");
        style.push_layer(StyleLayer::new("labels", Some("v"), LayerPaint::Symbol(paint)));
        (painter, style)
    }

    #[test]
    fn text_halo_draws_before_fill() {
        let paint = SymbolPaint {
            icon: SymbolPartPaint {
                opacity: PropertyValue::Constant(0.0),
                ..SymbolPartPaint::default()
            },
            text: SymbolPartPaint {
                halo_width: PropertyValue::Constant(1.5),
                ..SymbolPartPaint::default()
            },
            ..SymbolPaint::default()
        };
        let (mut painter, mut style) = setup(RenderConfig::default(), paint, [&[0.0], &[0.0]]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        assert_eq!(draws_by_shader(&painter, "symbol_sdf").len(), 4);
        let halo = painter.context().backend().uniform_writes("u_is_halo");
        assert_eq!(halo.first(), Some(&UniformData::Int(1)));
    }

    #[test]
    fn sort_key_applies_only_to_overlapping_symbols() {
        let paint = SymbolPaint {
            sort_key: true,
            text: SymbolPartPaint {
                opacity: PropertyValue::Constant(0.0),
                ..SymbolPartPaint::default()
            },
            ..SymbolPaint::default()
        };
        let (mut painter, mut style) =
            setup(RenderConfig::default(), paint, [&[5.0, 1.0], &[3.0, 2.0]]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));

        let order: Vec<u32> = draws_by_shader(&painter, "symbol_icon")
            .iter()
            .map(|d| d.first_index / 3)
            .collect();
        assert_eq!(order, [1, 2, 3, 5]);
    }

    #[test]
    fn unscaled_flat_icons_sample_nearest() {
        let paint = SymbolPaint {
            text: SymbolPartPaint {
                opacity: PropertyValue::Constant(0.0),
                ..SymbolPartPaint::default()
            },
            ..SymbolPaint::default()
        };
        let (mut painter, mut style) = setup(RenderConfig::default(), paint, [&[0.0], &[0.0]]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let backend = painter.context().backend();
        assert!(
            backend
                .calls()
                .iter()
                .any(|c| matches!(c, Call::BindTexture(0, _, TextureFilter::Nearest, _)))
        );
    }

    #[test]
    fn collision_boxes_draw_as_lines() {
        let config = RenderConfig {
            show_collision_boxes: true,
            ..RenderConfig::default()
        };
        let (mut painter, mut style) = setup(config, SymbolPaint::default(), [&[0.0], &[0.0]]);
        render(&mut painter, &mut style, &FlatTransform::new(2.0));
        let boxes = draws_by_shader(&painter, "collision_box");
        assert_eq!(boxes.len(), 2);
        assert!(boxes.iter().all(|d| d.primitive == Primitive::Lines));
    }
}
