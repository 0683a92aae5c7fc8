use crate::style::ZoomHistory;

/// Renderer-wide settings. Fixed for the lifetime of a [`Painter`](crate::render::Painter).
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Parent zoom levels a tile may be drawn in place of missing children.
    pub max_underzoom: u32,
    /// Zoom levels a tile may be stretched beyond its source max zoom.
    pub max_overzoom: u32,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f32,
    /// Raster and symbol fade duration in milliseconds.
    pub fade_duration: f64,
    pub show_overdraw_inspector: bool,
    pub show_tile_boundaries: bool,
    pub show_collision_boxes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_underzoom: 10,
            max_overzoom: 3,
            pixel_ratio: 1.0,
            fade_duration: 300.0,
            show_overdraw_inspector: false,
            show_tile_boundaries: false,
            show_collision_boxes: false,
        }
    }
}

impl RenderConfig {
    /// Depth slices available to one style layer.
    #[inline]
    pub fn num_sublayers(&self) -> u32 {
        self.max_underzoom + self.max_overzoom + 1
    }
}

/// Per-frame inputs that are not part of the style.
#[derive(Debug, Clone, Default)]
pub struct FrameOptions {
    /// Frame timestamp in milliseconds.
    pub now: f64,
    pub zoom_history: ZoomHistory,
    /// Symbol fade progress since the last placement, `0..=1`.
    pub symbol_fade_change: f32,
    pub moving: bool,
    pub rotating: bool,
    pub zooming: bool,
    /// Drawing buffer size in device pixels.
    pub drawing_buffer_size: [u32; 2],
}
