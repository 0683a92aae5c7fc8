//! Shadow copy of backend state; forwards only changes.

use std::collections::HashMap;

use crate::color::Color;

use super::backend::Backend;
use super::buffer::{IndexBuffer, Texture, Vertex, VertexBuffer};
use super::color_mode::{BlendFunction, ColorMask, ColorMode};
use super::cull_face_mode::CullFaceMode;
use super::depth_mode::{DepthMask, DepthMode};
use super::stencil_mode::StencilMode;
use super::types::{
    AttributeBinding, BufferId, BufferKind, BufferUsage, CompareFunc, Face, FramebufferId,
    Primitive, ProgramId, StencilOp, TextureFilter, TextureFormat, TextureId, TextureWrap, Winding,
};

/// One cached piece of backend state. `None` means unknown.
#[derive(Debug, Clone)]
struct StateValue<T> {
    current: Option<T>,
}

impl<T> Default for StateValue<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T: PartialEq + Copy> StateValue<T> {
    /// Records `value`; returns whether the backend needs to hear about it.
    #[inline]
    fn update(&mut self, value: T) -> bool {
        if self.current == Some(value) {
            return false;
        }
        self.current = Some(value);
        true
    }

    #[inline]
    fn reset(&mut self) {
        self.current = None;
    }
}

#[derive(Debug, Default)]
struct GlState {
    depth_test: StateValue<bool>,
    depth_func: StateValue<CompareFunc>,
    depth_mask: StateValue<bool>,
    depth_range: StateValue<[f32; 2]>,

    stencil_test: StateValue<bool>,
    stencil_func: StateValue<(CompareFunc, u32, u32)>,
    stencil_mask: StateValue<u32>,
    stencil_op: StateValue<(StencilOp, StencilOp, StencilOp)>,

    blend: StateValue<bool>,
    blend_func: StateValue<BlendFunction>,
    blend_color: StateValue<Color>,
    color_mask: StateValue<ColorMask>,

    cull_face: StateValue<bool>,
    cull_face_side: StateValue<Face>,
    front_face: StateValue<Winding>,

    program: StateValue<ProgramId>,
    framebuffer: StateValue<FramebufferId>,
    viewport: StateValue<([i32; 2], [u32; 2])>,
    index_buffer: StateValue<BufferId>,
    textures: HashMap<u32, (TextureId, TextureFilter, TextureWrap)>,
}

/// Owns the backend and filters redundant state changes.
pub struct Context<B: Backend> {
    backend: B,
    state: GlState,
}

impl<B: Backend> Context<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: GlState::default(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access. Calls made this way bypass the state cache;
    /// follow them with [`Context::reset_state`] if they touch cached state.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    #[inline]
    pub fn is_context_lost(&self) -> bool {
        self.backend.is_context_lost()
    }

    /// Forgets all cached state; the next setter of each kind writes through.
    pub fn reset_state(&mut self) {
        let s = &mut self.state;
        s.depth_test.reset();
        s.depth_func.reset();
        s.depth_mask.reset();
        s.depth_range.reset();
        s.stencil_test.reset();
        s.stencil_func.reset();
        s.stencil_mask.reset();
        s.stencil_op.reset();
        s.blend.reset();
        s.blend_func.reset();
        s.blend_color.reset();
        s.color_mask.reset();
        s.cull_face.reset();
        s.cull_face_side.reset();
        s.front_face.reset();
        s.program.reset();
        s.framebuffer.reset();
        s.viewport.reset();
        s.index_buffer.reset();
        s.textures.clear();
    }

    /// Puts pipeline state back to what hosts expect between frames.
    pub fn set_default(&mut self) {
        self.set_depth_mode(&DepthMode::DISABLED);
        self.set_stencil_mode(&StencilMode::DISABLED);
        self.set_color_mode(&ColorMode::UNBLENDED);
        self.set_cull_face_mode(&CullFaceMode::DISABLED);
    }

    // ── pipeline state ───────────────────────────────────────────────────

    pub fn set_depth_mode(&mut self, mode: &DepthMode) {
        if mode.is_disabled() {
            if self.state.depth_test.update(false) {
                self.backend.set_depth_test(false);
            }
            return;
        }

        if self.state.depth_test.update(true) {
            self.backend.set_depth_test(true);
        }
        if self.state.depth_func.update(mode.func) {
            self.backend.set_depth_func(mode.func);
        }
        let write = mode.mask == DepthMask::ReadWrite;
        if self.state.depth_mask.update(write) {
            self.backend.set_depth_mask(write);
        }
        if self.state.depth_range.update(mode.range) {
            self.backend.set_depth_range(mode.range);
        }
    }

    pub fn set_stencil_mode(&mut self, mode: &StencilMode) {
        if mode.is_disabled() {
            if self.state.stencil_test.update(false) {
                self.backend.set_stencil_test(false);
            }
            return;
        }

        if self.state.stencil_test.update(true) {
            self.backend.set_stencil_test(true);
        }
        if self.state.stencil_mask.update(mode.write_mask) {
            self.backend.set_stencil_mask(mode.write_mask);
        }
        let ops = (mode.fail, mode.depth_fail, mode.pass);
        if self.state.stencil_op.update(ops) {
            self.backend.set_stencil_op(ops.0, ops.1, ops.2);
        }
        let func = (mode.test.func, mode.reference, mode.test.mask);
        if self.state.stencil_func.update(func) {
            self.backend.set_stencil_func(func.0, func.1, func.2);
        }
    }

    pub fn set_color_mode(&mut self, mode: &ColorMode) {
        if mode.is_unblended() {
            if self.state.blend.update(false) {
                self.backend.set_blend(false);
            }
        } else {
            if self.state.blend.update(true) {
                self.backend.set_blend(true);
            }
            if self.state.blend_func.update(mode.blend_function) {
                self.backend.set_blend_func(mode.blend_function);
            }
            if self.state.blend_color.update(mode.blend_color) {
                self.backend.set_blend_color(mode.blend_color);
            }
        }

        if self.state.color_mask.update(mode.mask) {
            self.backend.set_color_mask(mode.mask);
        }
    }

    pub fn set_cull_face_mode(&mut self, mode: &CullFaceMode) {
        if !mode.enabled {
            if self.state.cull_face.update(false) {
                self.backend.set_cull_face(false);
            }
            return;
        }

        if self.state.cull_face.update(true) {
            self.backend.set_cull_face(true);
        }
        if self.state.cull_face_side.update(mode.face) {
            self.backend.set_cull_face_side(mode.face);
        }
        if self.state.front_face.update(mode.winding) {
            self.backend.set_front_face(mode.winding);
        }
    }

    pub fn use_program(&mut self, program: ProgramId) {
        if self.state.program.update(program) {
            self.backend.use_program(program);
        }
    }

    // ── targets ──────────────────────────────────────────────────────────

    pub fn bind_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.state.framebuffer.update(framebuffer) {
            self.backend.bind_framebuffer(framebuffer);
        }
    }

    pub fn create_framebuffer(&mut self, color: &Texture) -> FramebufferId {
        self.backend.create_framebuffer(color.id)
    }

    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.state.framebuffer.current == Some(framebuffer) {
            self.state.framebuffer.reset();
        }
        self.backend.delete_framebuffer(framebuffer);
    }

    pub fn set_viewport(&mut self, origin: [i32; 2], size: [u32; 2]) {
        if self.state.viewport.update((origin, size)) {
            self.backend.set_viewport(origin, size);
        }
    }

    /// Clears the requested aspects, opening their write masks first.
    pub fn clear(&mut self, color: Option<Color>, depth: Option<f32>, stencil: Option<u32>) {
        if color.is_some() && self.state.color_mask.update(ColorMask::ALL) {
            self.backend.set_color_mask(ColorMask::ALL);
        }
        if depth.is_some() && self.state.depth_mask.update(true) {
            self.backend.set_depth_mask(true);
        }
        if stencil.is_some() && self.state.stencil_mask.update(0xFF) {
            self.backend.set_stencil_mask(0xFF);
        }
        self.backend.clear(color, depth, stencil);
    }

    // ── buffers ──────────────────────────────────────────────────────────

    pub fn create_vertex_buffer<V: Vertex>(
        &mut self,
        vertices: &[V],
        usage: BufferUsage,
    ) -> VertexBuffer {
        let id = self
            .backend
            .create_buffer(BufferKind::Vertex, bytemuck::cast_slice(vertices), usage);
        VertexBuffer {
            id,
            length: vertices.len() as u32,
            stride: std::mem::size_of::<V>() as u32,
            attributes: V::ATTRIBUTES,
        }
    }

    pub fn update_vertex_buffer<V: Vertex>(&mut self, buffer: &mut VertexBuffer, vertices: &[V]) {
        self.backend.update_buffer(buffer.id, bytemuck::cast_slice(vertices));
        buffer.length = vertices.len() as u32;
    }

    pub fn create_index_buffer(&mut self, indices: &[u16], usage: BufferUsage) -> IndexBuffer {
        let id = self
            .backend
            .create_buffer(BufferKind::Index, bytemuck::cast_slice(indices), usage);
        IndexBuffer {
            id,
            length: indices.len() as u32,
        }
    }

    pub fn delete_buffer(&mut self, buffer: BufferId) {
        if self.state.index_buffer.current == Some(buffer) {
            self.state.index_buffer.reset();
        }
        self.backend.delete_buffer(buffer);
    }

    pub fn bind_index_buffer(&mut self, buffer: &IndexBuffer) {
        if self.state.index_buffer.update(buffer.id) {
            self.backend.bind_index_buffer(buffer.id);
        }
    }

    pub fn bind_vertex_attributes(&mut self, bindings: &[AttributeBinding]) {
        self.backend.bind_vertex_attributes(bindings);
    }

    // ── textures ─────────────────────────────────────────────────────────

    pub fn create_texture(
        &mut self,
        size: [u32; 2],
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> Texture {
        let id = self.backend.create_texture(size, format, data);
        Texture { id, size, format }
    }

    pub fn update_texture(&mut self, texture: &mut Texture, size: [u32; 2], data: &[u8]) {
        self.backend.update_texture(texture.id, size, texture.format, data);
        texture.size = size;
    }

    pub fn delete_texture(&mut self, texture: &Texture) {
        self.state.textures.retain(|_, (id, _, _)| *id != texture.id);
        self.backend.delete_texture(texture.id);
    }

    pub fn bind_texture(
        &mut self,
        unit: u32,
        texture: &Texture,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) {
        let entry = (texture.id, filter, wrap);
        if self.state.textures.get(&unit) == Some(&entry) {
            return;
        }
        self.state.textures.insert(unit, entry);
        self.backend.bind_texture(unit, texture.id, filter, wrap);
    }

    // ── submission ───────────────────────────────────────────────────────

    #[inline]
    pub fn draw_elements(&mut self, primitive: Primitive, first_index: u32, index_count: u32) {
        self.backend.draw_elements(primitive, first_index, index_count);
    }
}
