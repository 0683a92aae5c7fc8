//! Graphics state value objects, uniform slots and the backend seam.

mod backend;
mod buffer;
mod color_mode;
mod context;
mod cull_face_mode;
mod depth_mode;
mod recording;
mod stencil_mode;
mod types;
mod uniform;
pub mod wgpu_state;

pub use backend::Backend;
pub use buffer::{
    IndexBuffer, PosVertex, RasterBoundsVertex, Segment, Texture, Vertex, VertexBuffer,
};
pub use color_mode::{BlendFunction, ColorMask, ColorMode};
pub use context::Context;
pub use cull_face_mode::CullFaceMode;
pub use depth_mode::{DepthMask, DepthMode};
pub use recording::{Call, DrawState, RecordingBackend};
pub use stencil_mode::{StencilMode, StencilTest};
pub use types::*;
pub use uniform::{
    Mat4, Uniform, UniformData, UniformKind, UniformSlot, UniformValue, UniformValues,
};
