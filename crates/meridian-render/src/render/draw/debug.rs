use crate::color::Color;
use crate::error::Result;
use crate::gl::{Backend, ColorMode, CullFaceMode, DepthMode, Primitive, StencilMode, UniformValues};
use crate::program::{DrawCall, ShaderId};
use crate::render::painter::{Frame, Painter};
use crate::source::OverscaledTileId;

/// Outlines `tile`'s boundary in red.
pub fn draw_debug_tile<B: Backend>(
    painter: &mut Painter<B>,
    frame: &Frame<'_>,
    tile: &OverscaledTileId,
) -> Result<()> {
    let buffers = painter.ensure_buffers();
    let uniforms = UniformValues::new()
        .with("u_matrix", frame.transform.pos_matrix(&tile.to_unwrapped(), false))
        .with("u_color", Color::RED)
        .with("u_overlay", 0_i32)
        .with("u_overlay_scale", 1.0);

    painter.draw_program(
        ShaderId::Debug,
        DrawCall {
            primitive: Primitive::LineStrip,
            depth: DepthMode::DISABLED,
            stencil: StencilMode::DISABLED,
            color: ColorMode::ALPHA_BLENDED,
            cull: CullFaceMode::DISABLED,
            uniforms: &uniforms,
            configuration: None,
            paint: None,
            zoom: frame.transform.zoom(),
            layout_vertex_buffer: &buffers.tile_extent,
            index_buffer: &buffers.border_indices,
            segments: &buffers.border_segments,
            extra_vertex_buffers: &[],
        },
    )
}
