//! Per-tile, per-layer geometry uploaded by the tile pipeline.
//!
//! Buckets are read-only here: the renderer binds their buffers and walks
//! their segments.

use bytemuck::{Pod, Zeroable};

use crate::gl::{AttributeType, IndexBuffer, Segment, Vertex, VertexAttribute, VertexBuffer};
use crate::program::ProgramConfiguration;

macro_rules! attr {
    ($name:literal, $components:literal, $ty:ident, $offset:literal) => {
        VertexAttribute {
            name: $name,
            components: $components,
            ty: AttributeType::$ty,
            offset: $offset,
        }
    };
}

/// Line vertex: position packed with the extrusion normal, plus extrude data.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct LineVertex {
    pub pos_normal: [i16; 2],
    pub data: [u8; 4],
}

impl Vertex for LineVertex {
    const ATTRIBUTES: &'static [VertexAttribute] =
        &[attr!("a_pos_normal", 2, I16, 0), attr!("a_data", 4, U8, 4)];
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct ExtrusionVertex {
    pub pos: [i16; 2],
    pub normal_ed: [i16; 4],
}

impl Vertex for ExtrusionVertex {
    const ATTRIBUTES: &'static [VertexAttribute] =
        &[attr!("a_pos", 2, I16, 0), attr!("a_normal_ed", 4, I16, 4)];
}

/// Static symbol quad corner.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct SymbolLayoutVertex {
    pub pos_offset: [i16; 4],
    pub data: [u16; 4],
}

impl Vertex for SymbolLayoutVertex {
    const ATTRIBUTES: &'static [VertexAttribute] =
        &[attr!("a_pos_offset", 4, I16, 0), attr!("a_data", 4, U16, 8)];
}

/// Per-frame projected anchor for line-placed symbols.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct SymbolDynamicVertex {
    pub projected_pos: [f32; 3],
}

impl Vertex for SymbolDynamicVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[attr!("a_projected_pos", 3, F32, 0)];
}

/// Packed placement opacity written by the collision pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct SymbolOpacityVertex {
    pub fade_opacity: u32,
}

impl Vertex for SymbolOpacityVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[attr!("a_fade_opacity", 1, U8, 0)];
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct CollisionBoxVertex {
    pub pos: [i16; 2],
    pub anchor_pos: [i16; 2],
    pub extrude: [i16; 2],
}

impl Vertex for CollisionBoxVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        attr!("a_pos", 2, I16, 0),
        attr!("a_anchor_pos", 2, I16, 4),
        attr!("a_extrude", 2, I16, 8),
    ];
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct CollisionPlacementVertex {
    /// `[placed, not_used, 0, 0]`.
    pub placed: [u8; 4],
    pub shift: [f32; 2],
}

impl Vertex for CollisionPlacementVertex {
    const ATTRIBUTES: &'static [VertexAttribute] =
        &[attr!("a_placed", 2, U8, 0), attr!("a_shift", 2, F32, 4)];
}

/// Layout buffer, indices and draw segments of one geometry stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffers {
    pub layout_vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillBucket {
    pub geometry: GeometryBuffers,
    /// Line indices tracing polygon rings for the antialiased outline.
    pub outline_index_buffer: IndexBuffer,
    pub outline_segments: Vec<Segment>,
    pub configuration: ProgramConfiguration,
}

/// Line, circle and extrusion buckets share this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBucket {
    pub geometry: GeometryBuffers,
    pub configuration: ProgramConfiguration,
}

/// How a symbol size varies, mirrored in `u_is_size_*_constant`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolSize {
    Constant(f32),
    /// Per feature, independent of zoom.
    Source,
    /// Zoom-dependent only.
    Camera { zoom_range: [f32; 2], size_range: [f32; 2] },
    /// Per feature at two zoom stops.
    Composite { zoom_range: [f32; 2] },
}

impl SymbolSize {
    pub fn is_zoom_constant(&self) -> bool {
        matches!(self, SymbolSize::Constant(_) | SymbolSize::Source)
    }

    pub fn is_feature_constant(&self) -> bool {
        matches!(self, SymbolSize::Constant(_) | SymbolSize::Camera { .. })
    }

    /// `(u_size_t, u_size)` at `zoom`.
    pub fn evaluate(&self, zoom: f32) -> (f32, f32) {
        let t = |[z0, z1]: [f32; 2]| {
            if z1 > z0 {
                ((zoom - z0) / (z1 - z0)).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        match *self {
            SymbolSize::Constant(size) => (0.0, size),
            SymbolSize::Source => (0.0, 0.0),
            SymbolSize::Camera { zoom_range, size_range } => {
                let t = t(zoom_range);
                (0.0, size_range[0] + (size_range[1] - size_range[0]) * t)
            }
            SymbolSize::Composite { zoom_range } => (t(zoom_range), 0.0),
        }
    }
}

/// Icon or text half of a symbol bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBuffers {
    pub geometry: GeometryBuffers,
    pub dynamic_layout_vertex_buffer: VertexBuffer,
    pub opacity_vertex_buffer: VertexBuffer,
    pub size: SymbolSize,
    pub configuration: ProgramConfiguration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionBuffers {
    pub geometry: GeometryBuffers,
    pub dynamic_vertex_buffer: VertexBuffer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBucket {
    pub icon: Option<SymbolBuffers>,
    pub text: Option<SymbolBuffers>,
    pub sdf_icons: bool,
    /// Icons were resized at layout time and need bilinear filtering.
    pub icons_need_linear: bool,
    /// Symbols may overlap, so a sort key can interleave them across tiles.
    pub can_overlap: bool,
    pub collision_box: Option<CollisionBuffers>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bucket {
    Fill(FillBucket),
    Line(GeometryBucket),
    Circle(GeometryBucket),
    FillExtrusion(GeometryBucket),
    Symbol(SymbolBucket),
}

impl Bucket {
    pub fn as_fill(&self) -> Option<&FillBucket> {
        match self {
            Bucket::Fill(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&GeometryBucket> {
        match self {
            Bucket::Line(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<&GeometryBucket> {
        match self {
            Bucket::Circle(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_fill_extrusion(&self) -> Option<&GeometryBucket> {
        match self {
            Bucket::FillExtrusion(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&SymbolBucket> {
        match self {
            Bucket::Symbol(b) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_size_kinds() {
        let constant = SymbolSize::Constant(16.0);
        assert!(constant.is_zoom_constant() && constant.is_feature_constant());
        assert_eq!(constant.evaluate(3.0), (0.0, 16.0));

        let camera = SymbolSize::Camera {
            zoom_range: [10.0, 12.0],
            size_range: [10.0, 20.0],
        };
        assert!(!camera.is_zoom_constant() && camera.is_feature_constant());
        assert_eq!(camera.evaluate(11.0), (0.0, 15.0));
        assert_eq!(camera.evaluate(20.0), (0.0, 20.0));

        let composite = SymbolSize::Composite { zoom_range: [0.0, 4.0] };
        assert!(!composite.is_feature_constant());
        assert_eq!(composite.evaluate(1.0), (0.25, 0.0));
    }

    #[test]
    fn vertex_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<LineVertex>(), 8);
        assert_eq!(std::mem::size_of::<SymbolLayoutVertex>(), 16);
        assert_eq!(std::mem::size_of::<CollisionPlacementVertex>(), 12);
    }
}
