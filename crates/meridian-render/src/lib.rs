//! Render orchestration for tiled vector maps.
//!
//! A [`Painter`](render::Painter) draws a [`Style`](style::Style) for one
//! camera ([`Transform`](transform::Transform)) through a [`Backend`](gl::Backend).
//! It schedules the offscreen, opaque and translucent passes, gives every
//! layer its own depth band, masks tiles with stencil ids and caches compiled
//! programs per paint configuration. Tile loading, layout and the camera
//! itself belong to the caller.

pub mod atlas;
pub mod color;
pub mod config;
pub mod error;
pub mod gl;
pub mod logging;
pub mod math;
pub mod program;
pub mod render;
pub mod source;
pub mod style;
pub mod transform;

pub use error::{RenderError, Result};
