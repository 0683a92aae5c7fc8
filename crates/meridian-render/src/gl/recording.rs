//! In-memory backend that records every call. Used by tests and as a
//! headless backend.

use std::collections::HashMap;

use crate::color::Color;

use super::backend::Backend;
use super::color_mode::{BlendFunction, ColorMask};
use super::types::{
    AttributeBinding, AttributeLocation, BufferId, BufferKind, BufferUsage, CompareFunc, Face,
    FramebufferId, Primitive, ProgramId, StencilOp, TextureFilter, TextureFormat, TextureId,
    TextureWrap, UniformLocation, Winding,
};
use super::uniform::UniformData;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer(BufferId, BufferKind, usize),
    UpdateBuffer(BufferId, usize),
    DeleteBuffer(BufferId),
    BindVertexAttributes(Vec<AttributeBinding>),
    BindIndexBuffer(BufferId),

    CompileProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    Uniform(UniformLocation, UniformData),

    DepthTest(bool),
    DepthFunc(CompareFunc),
    DepthMask(bool),
    DepthRange([f32; 2]),

    StencilTest(bool),
    StencilFunc(CompareFunc, u32, u32),
    StencilMask(u32),
    StencilOp(StencilOp, StencilOp, StencilOp),

    Blend(bool),
    BlendFunc(BlendFunction),
    BlendColor(Color),
    ColorMask(ColorMask),

    CullFace(bool),
    CullFaceSide(Face),
    FrontFace(Winding),

    CreateTexture(TextureId, [u32; 2], TextureFormat),
    UpdateTexture(TextureId, [u32; 2]),
    DeleteTexture(TextureId),
    BindTexture(u32, TextureId, TextureFilter, TextureWrap),

    CreateFramebuffer(FramebufferId, TextureId),
    DeleteFramebuffer(FramebufferId),
    BindFramebuffer(FramebufferId),
    Viewport([i32; 2], [u32; 2]),
    Clear(Option<Color>, Option<f32>, Option<u32>),

    DrawElements(Primitive, u32, u32),
}

/// Pipeline state in effect when a draw was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub program: Option<ProgramId>,
    pub primitive: Primitive,
    pub first_index: u32,
    pub index_count: u32,
    pub depth_test: bool,
    pub depth_func: Option<CompareFunc>,
    pub depth_mask: bool,
    pub depth_range: [f32; 2],
    pub stencil_test: bool,
    /// `(func, reference, mask)`.
    pub stencil_func: Option<(CompareFunc, u32, u32)>,
    pub color_mask: ColorMask,
    pub framebuffer: FramebufferId,
}

#[derive(Debug, Clone)]
struct ProgramRecord {
    vertex: String,
    fragment: String,
    uniforms: HashMap<String, UniformLocation>,
    attributes: HashMap<String, AttributeLocation>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<Call>,
    next_id: u32,
    programs: HashMap<ProgramId, ProgramRecord>,
    uniform_names: HashMap<UniformLocation, String>,
    compile_error: Option<String>,
    context_lost: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawElements(..)))
            .count()
    }

    pub fn uniform_write_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Uniform(..)))
            .count()
    }

    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        self.uniform_names.get(&location).map(String::as_str)
    }

    /// Every value written to uniforms called `name`, in call order.
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformData> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Uniform(loc, data) if self.uniform_name(*loc) == Some(name) => Some(*data),
                _ => None,
            })
            .collect()
    }

    /// Vertex and fragment source of a compiled program.
    pub fn program_source(&self, program: ProgramId) -> Option<(&str, &str)> {
        self.programs
            .get(&program)
            .map(|p| (p.vertex.as_str(), p.fragment.as_str()))
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Makes the next compilations fail with `log`. `None` restores success.
    pub fn set_compile_error(&mut self, log: Option<String>) {
        self.compile_error = log;
    }

    pub fn lose_context(&mut self) {
        self.context_lost = true;
    }

    pub fn restore_context(&mut self) {
        self.context_lost = false;
        self.programs.clear();
        self.uniform_names.clear();
    }

    /// Replays the recorded calls and snapshots state at every draw.
    pub fn draw_states(&self) -> Vec<DrawState> {
        let mut program = None;
        let mut depth_test = false;
        let mut depth_func = None;
        let mut depth_mask = true;
        let mut depth_range = [0.0, 1.0];
        let mut stencil_test = false;
        let mut stencil_func = None;
        let mut color_mask = ColorMask::ALL;
        let mut framebuffer = FramebufferId::DEFAULT;

        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                Call::UseProgram(p) => program = Some(*p),
                Call::DepthTest(v) => depth_test = *v,
                Call::DepthFunc(f) => depth_func = Some(*f),
                Call::DepthMask(v) => depth_mask = *v,
                Call::DepthRange(r) => depth_range = *r,
                Call::StencilTest(v) => stencil_test = *v,
                Call::StencilFunc(f, r, m) => stencil_func = Some((*f, *r, *m)),
                Call::ColorMask(m) => color_mask = *m,
                Call::BindFramebuffer(fb) => framebuffer = *fb,
                Call::DrawElements(primitive, first_index, index_count) => out.push(DrawState {
                    program,
                    primitive: *primitive,
                    first_index: *first_index,
                    index_count: *index_count,
                    depth_test,
                    depth_func,
                    depth_mask,
                    depth_range,
                    stencil_test,
                    stencil_func,
                    color_mask,
                    framebuffer,
                }),
                _ => {}
            }
        }
        out
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl Backend for RecordingBackend {
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8], _usage: BufferUsage) -> BufferId {
        let id = BufferId(self.next_id());
        self.calls.push(Call::CreateBuffer(id, kind, data.len()));
        id
    }

    fn update_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        self.calls.push(Call::UpdateBuffer(buffer, data.len()));
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn bind_vertex_attributes(&mut self, bindings: &[AttributeBinding]) {
        self.calls.push(Call::BindVertexAttributes(bindings.to_vec()));
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::BindIndexBuffer(buffer));
    }

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, String> {
        if let Some(log) = &self.compile_error {
            return Err(log.clone());
        }
        let id = ProgramId(self.next_id());
        self.programs.insert(
            id,
            ProgramRecord {
                vertex: vertex.to_owned(),
                fragment: fragment.to_owned(),
                uniforms: HashMap::new(),
                attributes: HashMap::new(),
            },
        );
        self.calls.push(Call::CompileProgram(id));
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.calls.push(Call::DeleteProgram(program));
    }

    fn attribute_location(&mut self, program: ProgramId, name: &str) -> Option<AttributeLocation> {
        let record = self.programs.get_mut(&program)?;
        let next = record.attributes.len() as u32;
        Some(
            *record
                .attributes
                .entry(name.to_owned())
                .or_insert(AttributeLocation(next)),
        )
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.contains_key(&program) {
            return None;
        }
        let fresh = UniformLocation(self.next_id());
        let record = self.programs.get_mut(&program)?;
        let location = *record.uniforms.entry(name.to_owned()).or_insert(fresh);
        self.uniform_names.insert(location, name.to_owned());
        Some(location)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformData) {
        self.calls.push(Call::Uniform(location, value));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(Call::DepthTest(enabled));
    }

    fn set_depth_func(&mut self, func: CompareFunc) {
        self.calls.push(Call::DepthFunc(func));
    }

    fn set_depth_mask(&mut self, write: bool) {
        self.calls.push(Call::DepthMask(write));
    }

    fn set_depth_range(&mut self, range: [f32; 2]) {
        self.calls.push(Call::DepthRange(range));
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.calls.push(Call::StencilTest(enabled));
    }

    fn set_stencil_func(&mut self, func: CompareFunc, reference: u32, mask: u32) {
        self.calls.push(Call::StencilFunc(func, reference, mask));
    }

    fn set_stencil_mask(&mut self, write_mask: u32) {
        self.calls.push(Call::StencilMask(write_mask));
    }

    fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.calls.push(Call::StencilOp(fail, depth_fail, pass));
    }

    fn set_blend(&mut self, enabled: bool) {
        self.calls.push(Call::Blend(enabled));
    }

    fn set_blend_func(&mut self, func: BlendFunction) {
        self.calls.push(Call::BlendFunc(func));
    }

    fn set_blend_color(&mut self, color: Color) {
        self.calls.push(Call::BlendColor(color));
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.calls.push(Call::ColorMask(mask));
    }

    fn set_cull_face(&mut self, enabled: bool) {
        self.calls.push(Call::CullFace(enabled));
    }

    fn set_cull_face_side(&mut self, face: Face) {
        self.calls.push(Call::CullFaceSide(face));
    }

    fn set_front_face(&mut self, winding: Winding) {
        self.calls.push(Call::FrontFace(winding));
    }

    fn create_texture(
        &mut self,
        size: [u32; 2],
        format: TextureFormat,
        _data: Option<&[u8]>,
    ) -> TextureId {
        let id = TextureId(self.next_id());
        self.calls.push(Call::CreateTexture(id, size, format));
        id
    }

    fn update_texture(
        &mut self,
        texture: TextureId,
        size: [u32; 2],
        _format: TextureFormat,
        _data: &[u8],
    ) {
        self.calls.push(Call::UpdateTexture(texture, size));
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn bind_texture(
        &mut self,
        unit: u32,
        texture: TextureId,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) {
        self.calls.push(Call::BindTexture(unit, texture, filter, wrap));
    }

    fn create_framebuffer(&mut self, color: TextureId) -> FramebufferId {
        let id = FramebufferId(self.next_id());
        self.calls.push(Call::CreateFramebuffer(id, color));
        id
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.calls.push(Call::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.calls.push(Call::BindFramebuffer(framebuffer));
    }

    fn set_viewport(&mut self, origin: [i32; 2], size: [u32; 2]) {
        self.calls.push(Call::Viewport(origin, size));
    }

    fn clear(&mut self, color: Option<Color>, depth: Option<f32>, stencil: Option<u32>) {
        self.calls.push(Call::Clear(color, depth, stencil));
    }

    fn draw_elements(&mut self, primitive: Primitive, first_index: u32, index_count: u32) {
        self.calls.push(Call::DrawElements(primitive, first_index, index_count));
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost
    }
}
