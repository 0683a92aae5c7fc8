use bytemuck::{Pod, Zeroable};

use super::types::{AttributeType, BufferId, TextureFormat, TextureId, VertexAttribute};

/// Plain vertex struct with a static attribute layout.
pub trait Vertex: Pod {
    const ATTRIBUTES: &'static [VertexAttribute];
}

/// Uploaded vertex data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexBuffer {
    pub id: BufferId,
    /// Vertex count.
    pub length: u32,
    /// Bytes per vertex.
    pub stride: u32,
    pub attributes: &'static [VertexAttribute],
}

/// Uploaded `u16` indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBuffer {
    pub id: BufferId,
    /// Index count.
    pub length: u32,
}

/// A contiguous run of primitives sharing one vertex base.
///
/// Indices inside a segment are relative to `vertex_offset`, which keeps
/// them addressable with 16 bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub vertex_offset: u32,
    pub primitive_offset: u32,
    pub vertex_length: u32,
    pub primitive_length: u32,
    /// Per-feature draw order for sort-key layers; `0` otherwise.
    pub sort_key: f32,
}

impl Segment {
    /// One segment spanning a whole buffer pair.
    pub fn whole(vertex_length: u32, primitive_length: u32) -> Self {
        Self {
            vertex_offset: 0,
            primitive_offset: 0,
            vertex_length,
            primitive_length,
            sort_key: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub size: [u32; 2],
    pub format: TextureFormat,
}

// ── shared vertex layouts ────────────────────────────────────────────────

/// Tile-space position only. Used for clip masks, backgrounds and debug quads.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct PosVertex {
    pub pos: [i16; 2],
}

impl Vertex for PosVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[VertexAttribute {
        name: "a_pos",
        components: 2,
        ty: AttributeType::I16,
        offset: 0,
    }];
}

/// Tile-space position plus texture coordinate, for raster and hillshade quads.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct RasterBoundsVertex {
    pub pos: [i16; 2],
    pub texture_pos: [i16; 2],
}

impl Vertex for RasterBoundsVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            name: "a_pos",
            components: 2,
            ty: AttributeType::I16,
            offset: 0,
        },
        VertexAttribute {
            name: "a_texture_pos",
            components: 2,
            ty: AttributeType::I16,
            offset: 4,
        },
    ];
}
