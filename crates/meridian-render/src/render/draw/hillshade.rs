use crate::error::Result;
use crate::gl::{
    Backend, ColorMode, CullFaceMode, DepthMask, DepthMode, FramebufferId, Mat4, Primitive,
    StencilMode,
    TextureFilter, TextureFormat, TextureWrap, UniformValues,
};
use crate::math::{mat4_ortho, mat4_translate};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{LayerDraw, Painter, PreparedHillshade};
use crate::render::pass::RenderPass;
use crate::source::{DemData, EXTENT, OverscaledTileId};
use crate::style::{HillshadePaint, TranslateAnchor};

/// Hillshading in two steps: the offscreen pass turns each DEM tile into a
/// slope texture, the translucent pass shades with it.
pub fn draw_hillshade<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &HillshadePaint,
) -> Result<()> {
    let depth = draw.depth_mode_for_sublayer(0, DepthMask::ReadOnly);
    let color = painter.color_mode_for_render_pass(draw.pass());
    match draw.pass() {
        RenderPass::Offscreen => {
            prepare_tiles(painter, draw, depth, color)?;
            painter
                .context
                .set_viewport([0, 0], draw.frame.options.drawing_buffer_size);
            Ok(())
        }
        RenderPass::Translucent => render_tiles(painter, draw, paint, depth, color),
        RenderPass::Opaque => Ok(()),
    }
}

fn prepare_tiles<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    depth: DepthMode,
    color: ColorMode,
) -> Result<()> {
    let Some(source) = draw.source else { return Ok(()) };
    let buffers = painter.ensure_buffers();

    for coord in draw.coords {
        let Some(tile) = source.tile(coord) else { continue };
        let Some(dem) = &tile.dem else { continue };
        let key = (draw.layer.id.clone(), *coord);
        let existing = painter.hillshade.get(&key).copied();
        if existing.is_some_and(|p| p.revision == dem.revision) {
            continue;
        }

        let stride = dem.stride();
        let prepared = match existing {
            Some(mut prepared) => {
                painter
                    .context
                    .update_texture(&mut prepared.dem_texture, [stride, stride], dem.pixels.data());
                prepared.revision = dem.revision;
                prepared
            }
            None => {
                let dem_texture =
                    painter
                        .context
                        .create_texture(
                            [stride, stride],
                            TextureFormat::Rgba8,
                            Some(dem.pixels.data()),
                        );
                let texture = painter
                    .context
                    .create_texture([dem.dim, dem.dim], TextureFormat::Rgba8, None);
                let framebuffer = painter.context.create_framebuffer(&texture);
                PreparedHillshade {
                    dem_texture,
                    texture,
                    framebuffer,
                    revision: dem.revision,
                }
            }
        };
        painter.hillshade.insert(key, prepared);

        painter
            .context
            .bind_texture(1, &prepared.dem_texture, TextureFilter::Nearest, TextureWrap::Clamp);
        painter.context.bind_framebuffer(prepared.framebuffer);
        painter.context.set_viewport([0, 0], [dem.dim, dem.dim]);

        let uniforms = prepare_uniforms(coord, dem);
        painter.draw_program(
            ShaderId::HillshadePrepare,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil: StencilMode::DISABLED,
                color,
                cull: CullFaceMode::DISABLED,
                uniforms: &uniforms,
                configuration: None,
                paint: None,
                zoom: draw.frame.transform.zoom(),
                layout_vertex_buffer: &buffers.raster_bounds,
                index_buffer: &buffers.quad_indices,
                segments: &buffers.quad_segments,
                extra_vertex_buffers: &[],
            },
        )?;
        log::trace!("prepared hillshade {coord} for {}", draw.layer.id);
    }
    painter.context.bind_framebuffer(FramebufferId::DEFAULT);
    Ok(())
}

fn prepare_uniforms(coord: &OverscaledTileId, dem: &DemData) -> UniformValues {
    let extent = f64::from(EXTENT);
    let matrix = mat4_ortho(0.0, extent, -extent, 0.0, 0.0, 1.0);
    let matrix = mat4_translate(&matrix, [0.0, -(EXTENT as f32), 0.0]);
    let stride = dem.stride() as f32;
    UniformValues::new()
        .with("u_matrix", matrix)
        .with("u_image", 1_i32)
        .with("u_dimension", [stride, stride])
        .with("u_zoom", f32::from(coord.overscaled_z))
        .with("u_unpack", dem.encoding.unpack_vector())
}

fn render_tiles<B: Backend>(
    painter: &mut Painter<B>,
    draw: &LayerDraw<'_>,
    paint: &HillshadePaint,
    depth: DepthMode,
    color: ColorMode,
) -> Result<()> {
    let transform = draw.frame.transform;
    let buffers = painter.ensure_buffers();
    let align = !draw.frame.options.moving;

    let mut azimuth = paint.illumination_direction.to_radians();
    if paint.illumination_anchor == TranslateAnchor::Viewport {
        azimuth -= transform.angle();
    }

    for (coord, stencil) in painter.stencil_config_for_overlap(draw.coords) {
        let Some(prepared) = painter.hillshade.get(&(draw.layer.id.clone(), coord)).copied() else {
            continue;
        };
        painter
            .context
            .bind_texture(0, &prepared.texture, TextureFilter::Linear, TextureWrap::Clamp);

        let matrix: Mat4 = transform.pos_matrix(&coord.to_unwrapped(), align);
        let uniforms = UniformValues::new()
            .with("u_matrix", matrix)
            .with("u_image", 0_i32)
            .with("u_latrange", tile_lat_range(&coord))
            .with("u_light", [paint.exaggeration, azimuth])
            .with("u_shadow", paint.shadow_color)
            .with("u_highlight", paint.highlight_color)
            .with("u_accent", paint.accent_color);

        painter.draw_program(
            ShaderId::Hillshade,
            DrawCall {
                primitive: Primitive::Triangles,
                depth,
                stencil,
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

/// Latitudes of the tile's north and south edges.
pub fn tile_lat_range(coord: &OverscaledTileId) -> [f32; 2] {
    let tiles = 2f64.powi(i32::from(coord.canonical.z));
    let y = f64::from(coord.canonical.y);
    [mercator_lat(y / tiles) as f32, mercator_lat((y + 1.0) / tiles) as f32]
}

/// Latitude of a mercator `y` in `0..=1`.
fn mercator_lat(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    360.0 / std::f64::consts::PI * (y2.to_radians()).exp().atan() - 90.0
}
