use crate::color::Color;

use super::color_mode::{BlendFunction, ColorMask};
use super::types::{
    AttributeBinding, AttributeLocation, BufferId, BufferKind, BufferUsage, CompareFunc, Face,
    FramebufferId, Primitive, ProgramId, StencilOp, TextureFilter, TextureFormat, TextureId,
    TextureWrap, UniformLocation, Winding,
};
use super::uniform::UniformData;

/// Immediate-mode graphics surface the renderer drives.
///
/// Every setter is a plain forward; redundant calls are filtered by
/// [`Context`](super::Context) before they get here.
pub trait Backend {
    // ── buffers ──────────────────────────────────────────────────────────

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8], usage: BufferUsage) -> BufferId;
    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);
    fn bind_vertex_attributes(&mut self, bindings: &[AttributeBinding]);
    fn bind_index_buffer(&mut self, buffer: BufferId);

    // ── programs ─────────────────────────────────────────────────────────

    /// Compiles and links a program. `Err` carries the info log.
    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, String>;
    fn delete_program(&mut self, program: ProgramId);
    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<AttributeLocation>;
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn use_program(&mut self, program: ProgramId);
    fn set_uniform(&mut self, location: UniformLocation, value: UniformData);

    // ── depth ────────────────────────────────────────────────────────────

    fn set_depth_test(&mut self, enabled: bool);
    fn set_depth_func(&mut self, func: CompareFunc);
    fn set_depth_mask(&mut self, write: bool);
    fn set_depth_range(&mut self, range: [f32; 2]);

    // ── stencil ──────────────────────────────────────────────────────────

    fn set_stencil_test(&mut self, enabled: bool);
    fn set_stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32);
    fn set_stencil_mask(&mut self, write_mask: u32);
    fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);

    // ── color ────────────────────────────────────────────────────────────

    fn set_blend(&mut self, enabled: bool);
    fn set_blend_func(&mut self, func: BlendFunction);
    fn set_blend_color(&mut self, color: Color);
    fn set_color_mask(&mut self, mask: ColorMask);

    // ── culling ──────────────────────────────────────────────────────────

    fn set_cull_face(&mut self, enabled: bool);
    fn set_cull_face_side(&mut self, face: Face);
    fn set_front_face(&mut self, winding: Winding);

    // ── textures / targets ───────────────────────────────────────────────

    fn create_texture(
        &mut self,
        size: [u32; 2],
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> TextureId;
    fn update_texture(
        &mut self,
        texture: TextureId,
        size: [u32; 2],
        format: TextureFormat,
        data: &[u8],
    );
    fn delete_texture(&mut self, texture: TextureId);
    fn bind_texture(
        &mut self,
        unit: u32,
        texture: TextureId,
        filter: TextureFilter,
        wrap: TextureWrap,
    );

    fn create_framebuffer(&mut self, color: TextureId) -> FramebufferId;
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);
    fn bind_framebuffer(&mut self, framebuffer: FramebufferId);
    fn set_viewport(&mut self, origin: [i32; 2], size: [u32; 2]);

    /// Clears the bound framebuffer. `None` leaves that aspect untouched.
    fn clear(&mut self, color: Option<Color>, depth: Option<f32>, stencil: Option<u32>);

    // ── submission ───────────────────────────────────────────────────────

    /// Draws `index_count` indices starting at `first_index` of the bound index buffer.
    fn draw_elements(&mut self, primitive: Primitive, first_index: u32, index_count: u32);

    fn is_context_lost(&self) -> bool;
}
