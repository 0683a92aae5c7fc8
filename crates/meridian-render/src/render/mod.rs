//! Frame orchestration: pass scheduling, depth sublayers, tile clip masks
//! and the per-layer draw routines.

mod clip;
mod depth;
pub mod draw;
mod painter;
mod pass;
pub mod pattern;
mod sort_key;

pub use clip::TileClipRegistry;
pub use depth::{DEPTH_EPSILON, DepthAllocator};
pub use painter::{Frame, LayerDraw, Painter, translate_pos_matrix};
pub use pass::RenderPass;
pub use sort_key::{SegmentsRenderState, push_segments, sort_by_key};
