//! How each paint property of a (bucket, layer) pair reaches the shader:
//! as a uniform, as a per-vertex attribute, or interpolated between two
//! zoom stops.

use std::fmt::Write as _;

use crate::gl::{UniformKind, UniformValues, VertexBuffer};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintBinder {
    /// Same value for every feature; set as `u_<name>`.
    Constant,
    /// Per-feature value in a paint vertex buffer.
    Source { buffer: VertexBuffer },
    /// Per-feature values at two zoom stops; the shader mixes by `u_<name>_t`.
    Composite { buffer: VertexBuffer, zoom_range: [f32; 2] },
    /// Cross-faded image pattern. Without a buffer the atlas rectangles are
    /// uniforms (`u_pattern_from`, `u_pattern_to`).
    Pattern { buffer: Option<VertexBuffer> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaintProperty {
    /// Shader-side name without prefix, e.g. `color`.
    pub name: &'static str,
    pub kind: UniformKind,
    pub binder: PaintBinder,
}

/// Paint-property bindings shared by all programs drawing one bucket for one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramConfiguration {
    properties: Vec<PaintProperty>,
}

impl ProgramConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, kind: UniformKind, binder: PaintBinder) -> Self {
        self.properties.push(PaintProperty { name, kind, binder });
        self
    }

    #[inline]
    pub fn properties(&self) -> &[PaintProperty] {
        &self.properties
    }

    /// Part of the program cache key. Equal keys compile to identical programs.
    pub fn cache_key(&self) -> String {
        let mut key = String::new();
        for p in &self.properties {
            let tag = match &p.binder {
                PaintBinder::Constant => "u",
                PaintBinder::Source { .. } => "a",
                PaintBinder::Composite { .. } => "z",
                PaintBinder::Pattern { buffer: None } => "u",
                PaintBinder::Pattern { buffer: Some(_) } => "a",
            };
            if !key.is_empty() {
                key.push('/');
            }
            let _ = write!(key, "{tag}:{}", p.name);
        }
        key
    }

    /// Preprocessor lines selecting uniform vs attribute inputs.
    pub fn defines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for p in &self.properties {
            match &p.binder {
                PaintBinder::Constant => out.push(format!("#define HAS_UNIFORM_u_{}", p.name)),
                PaintBinder::Pattern { buffer: None } => {
                    out.push("#define HAS_UNIFORM_u_pattern_from".to_owned());
                    out.push("#define HAS_UNIFORM_u_pattern_to".to_owned());
                }
                _ => {}
            }
        }
        out
    }

    /// Uniforms this configuration adds to a program.
    pub fn uniform_layout(&self) -> Vec<(String, UniformKind)> {
        let mut out = Vec::new();
        for p in &self.properties {
            match &p.binder {
                PaintBinder::Constant => out.push((format!("u_{}", p.name), p.kind)),
                PaintBinder::Composite { .. } => {
                    out.push((format!("u_{}_t", p.name), UniformKind::Float))
                }
                PaintBinder::Pattern { buffer: None } => {
                    out.push(("u_pattern_from".to_owned(), UniformKind::Vec4));
                    out.push(("u_pattern_to".to_owned(), UniformKind::Vec4));
                }
                PaintBinder::Source { .. } | PaintBinder::Pattern { buffer: Some(_) } => {}
            }
        }
        out
    }

    /// Picks this configuration's uniform values out of the layer's paint
    /// constants and adds zoom interpolation factors.
    ///
    /// Constants the layer did not provide are left unset.
    pub fn uniform_values(&self, paint: &UniformValues, zoom: f32) -> UniformValues {
        let mut out = UniformValues::new();
        for p in &self.properties {
            match &p.binder {
                PaintBinder::Constant => {
                    let name = format!("u_{}", p.name);
                    if let Some(value) = paint.get(&name) {
                        out.set(name, *value);
                    }
                }
                PaintBinder::Composite { zoom_range, .. } => {
                    out.set(format!("u_{}_t", p.name), interpolation_factor(zoom, *zoom_range));
                }
                PaintBinder::Pattern { buffer: None } => {
                    for name in ["u_pattern_from", "u_pattern_to"] {
                        if let Some(value) = paint.get(name) {
                            out.set(name, *value);
                        }
                    }
                }
                PaintBinder::Source { .. } | PaintBinder::Pattern { buffer: Some(_) } => {}
            }
        }
        out
    }

    /// Per-feature vertex buffers bound next to the layout buffer.
    pub fn paint_vertex_buffers(&self) -> impl Iterator<Item = &VertexBuffer> {
        self.properties.iter().filter_map(|p| match &p.binder {
            PaintBinder::Source { buffer } | PaintBinder::Composite { buffer, .. } => Some(buffer),
            PaintBinder::Pattern { buffer } => buffer.as_ref(),
            PaintBinder::Constant => None,
        })
    }
}

/// Linear position of `zoom` inside `[z0, z1]`, clamped to `0..=1`.
fn interpolation_factor(zoom: f32, [z0, z1]: [f32; 2]) -> f32 {
    let span = z1 - z0;
    if span <= 0.0 {
        return 0.0;
    }
    ((zoom - z0) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::gl::{AttributeType, BufferId, UniformData, VertexAttribute};

    const A_OPACITY: &[VertexAttribute] = &[VertexAttribute {
        name: "a_opacity",
        components: 1,
        ty: AttributeType::F32,
        offset: 0,
    }];

    fn buffer(id: u32) -> VertexBuffer {
        VertexBuffer {
            id: BufferId(id),
            length: 4,
            stride: 4,
            attributes: A_OPACITY,
        }
    }

    #[test]
    fn binder_kind_changes_key() {
        let constant =
            ProgramConfiguration::new().with("opacity", UniformKind::Float, PaintBinder::Constant);
        let source = ProgramConfiguration::new().with(
            "opacity",
            UniformKind::Float,
            PaintBinder::Source { buffer: buffer(1) },
        );
        assert_ne!(constant.cache_key(), source.cache_key());
        assert_eq!(constant.defines(), vec!["#define HAS_UNIFORM_u_opacity".to_owned()]);
        assert!(source.defines().is_empty());
    }

    #[test]
    fn uniform_values_follow_binders() {
        let config = ProgramConfiguration::new()
            .with("color", UniformKind::Color, PaintBinder::Constant)
            .with("opacity", UniformKind::Float, PaintBinder::Source { buffer: buffer(1) })
            .with(
                "width",
                UniformKind::Float,
                PaintBinder::Composite {
                    buffer: buffer(2),
                    zoom_range: [10.0, 12.0],
                },
            );
        let paint = UniformValues::new()
            .with("u_color", Color::WHITE)
            .with("u_opacity", 0.5f32);

        let values = config.uniform_values(&paint, 11.0);
        assert_eq!(values.get("u_color"), Some(&UniformData::Color(Color::WHITE)));
        assert_eq!(values.get("u_opacity"), None);
        assert_eq!(values.get("u_width_t"), Some(&UniformData::Float(0.5)));
        assert_eq!(config.paint_vertex_buffers().count(), 2);
    }

    #[test]
    fn constant_pattern_exposes_rectangles() {
        let config = ProgramConfiguration::new().with(
            "pattern",
            UniformKind::Vec4,
            PaintBinder::Pattern { buffer: None },
        );
        let names: Vec<_> = config.uniform_layout().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["u_pattern_from", "u_pattern_to"]);
    }

    #[test]
    fn degenerate_zoom_range_is_zero() {
        assert_eq!(interpolation_factor(5.0, [3.0, 3.0]), 0.0);
        assert_eq!(interpolation_factor(20.0, [3.0, 4.0]), 1.0);
    }
}
