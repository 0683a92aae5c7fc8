use std::collections::HashMap;

use crate::error::{RenderError, Result};
use crate::gl::{
    AttributeBinding, AttributeLocation, Backend, ColorMode, Context, CullFaceMode, DepthMode,
    IndexBuffer, Primitive, ProgramId, Segment, StencilMode, Uniform, UniformData, UniformValues,
    VertexBuffer,
};

use super::configuration::ProgramConfiguration;
use super::layout::program_layout;
use super::shaders::{ShaderId, ShaderLibrary};

/// Everything one `draw` needs besides the program itself.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub primitive: Primitive,
    pub depth: DepthMode,
    pub stencil: StencilMode,
    pub color: ColorMode,
    pub cull: CullFaceMode,
    pub uniforms: &'a UniformValues,
    pub configuration: Option<&'a ProgramConfiguration>,
    /// Layer paint constants; the configuration decides which ones apply.
    pub paint: Option<&'a UniformValues>,
    pub zoom: f32,
    pub layout_vertex_buffer: &'a VertexBuffer,
    pub index_buffer: &'a IndexBuffer,
    pub segments: &'a [Segment],
    /// Buffers bound after the paint buffers, e.g. symbol placement data.
    pub extra_vertex_buffers: &'a [VertexBuffer],
}

/// A linked program plus its uniform slots and attribute locations.
#[derive(Debug)]
pub struct ProgramInstance {
    id: ProgramId,
    name: String,
    uniforms: HashMap<String, Uniform>,
    attributes: HashMap<&'static str, AttributeLocation>,
}

impl ProgramInstance {
    pub fn compile<B: Backend>(
        ctx: &mut Context<B>,
        shaders: &ShaderLibrary,
        shader: ShaderId,
        configuration: Option<&ProgramConfiguration>,
        overdraw_inspector: bool,
    ) -> Result<Self> {
        let source = shaders.get(shader).ok_or(RenderError::MissingShader(shader))?;

        let mut prelude = String::new();
        if let Some(config) = configuration {
            for define in config.defines() {
                prelude.push_str(&define);
                prelude.push('\n');
            }
        }
        if overdraw_inspector {
            prelude.push_str("#define OVERDRAW_INSPECTOR\n");
        }

        let vertex = format!("{prelude}{}", source.vertex);
        let fragment = format!("{prelude}{}", source.fragment);

        let name = match configuration {
            Some(config) if !config.properties().is_empty() => {
                format!("{shader}[{}]", config.cache_key())
            }
            _ => shader.to_string(),
        };

        let backend = ctx.backend_mut();
        let id = backend
            .compile_program(&vertex, &fragment)
            .map_err(|log| RenderError::ProgramCompile {
                name: name.clone(),
                log,
            })?;

        let layout = program_layout(shader);

        let mut attribute_names: Vec<&'static str> = layout.attributes.to_vec();
        if let Some(config) = configuration {
            for buffer in config.paint_vertex_buffers() {
                attribute_names.extend(buffer.attributes.iter().map(|a| a.name));
            }
        }
        let mut attributes = HashMap::new();
        for attr in attribute_names {
            if let Some(location) = backend.attribute_location(id, attr) {
                attributes.insert(attr, location);
            }
        }

        let mut uniforms = HashMap::new();
        for &(uniform, kind) in layout.uniforms {
            let location = backend.uniform_location(id, uniform);
            uniforms.insert(uniform.to_owned(), Uniform::new(kind, location));
        }
        if let Some(config) = configuration {
            for (uniform, kind) in config.uniform_layout() {
                let location = backend.uniform_location(id, &uniform);
                uniforms.insert(uniform, Uniform::new(kind, location));
            }
        }

        log::debug!("compiled program {name} ({} uniforms)", uniforms.len());

        Ok(Self {
            id,
            name,
            uniforms,
            attributes,
        })
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Sets pipeline state and uniforms, then issues one indexed draw per segment.
    pub fn draw<B: Backend>(&mut self, ctx: &mut Context<B>, call: DrawCall<'_>) -> Result<()> {
        ctx.set_depth_mode(&call.depth);
        ctx.set_stencil_mode(&call.stencil);
        ctx.set_color_mode(&call.color);
        ctx.set_cull_face_mode(&call.cull);
        ctx.use_program(self.id);

        for (name, value) in call.uniforms.iter() {
            self.set_uniform(ctx.backend_mut(), name, *value)?;
        }

        if let Some(config) = call.configuration {
            let empty = UniformValues::new();
            let paint = config.uniform_values(call.paint.unwrap_or(&empty), call.zoom);
            for (name, value) in paint.iter() {
                self.set_uniform(ctx.backend_mut(), name, *value)?;
            }
        }

        let paint_buffers: Vec<&VertexBuffer> = call
            .configuration
            .map(|c| c.paint_vertex_buffers().collect())
            .unwrap_or_default();

        ctx.bind_index_buffer(call.index_buffer);

        let per_primitive = call.primitive.vertices_per_primitive();
        let mut bindings = Vec::new();
        for segment in call.segments {
            bindings.clear();
            self.push_bindings(&mut bindings, call.layout_vertex_buffer, segment.vertex_offset);
            for buffer in &paint_buffers {
                self.push_bindings(&mut bindings, buffer, segment.vertex_offset);
            }
            for buffer in call.extra_vertex_buffers {
                self.push_bindings(&mut bindings, buffer, segment.vertex_offset);
            }
            ctx.bind_vertex_attributes(&bindings);

            ctx.draw_elements(
                call.primitive,
                segment.primitive_offset * per_primitive,
                segment.primitive_length * per_primitive,
            );
        }

        Ok(())
    }

    fn set_uniform<B: Backend>(
        &mut self,
        backend: &mut B,
        name: &str,
        value: UniformData,
    ) -> Result<()> {
        let Some(uniform) = self.uniforms.get_mut(name) else {
            return Err(RenderError::UnknownUniform {
                program: self.name.clone(),
                uniform: name.to_owned(),
            });
        };
        uniform
            .set(backend, value)
            .map_err(|expected| RenderError::UniformTypeMismatch {
                uniform: name.to_owned(),
                expected,
                actual: value.kind(),
            })?;
        Ok(())
    }

    /// Attributes the program does not use are skipped.
    fn push_bindings(
        &self,
        out: &mut Vec<AttributeBinding>,
        buffer: &VertexBuffer,
        vertex_offset: u32,
    ) {
        for attr in buffer.attributes {
            let Some(&location) = self.attributes.get(attr.name) else { continue };
            out.push(AttributeBinding {
                location,
                buffer: buffer.id,
                components: attr.components,
                ty: attr.ty,
                stride: buffer.stride,
                offset: attr.offset + vertex_offset * buffer.stride,
            });
        }
    }
}
