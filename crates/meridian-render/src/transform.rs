//! Camera queries the renderer needs. The camera itself lives with the caller.

use crate::gl::Mat4;
use crate::source::{OverscaledTileId, UnwrappedTileId};

pub trait Transform {
    /// Fractional zoom.
    fn zoom(&self) -> f32;

    /// Integer zoom used for tile selection.
    fn tile_zoom(&self) -> f32 {
        self.zoom().floor().max(0.0)
    }

    /// Map rotation in radians, counter-clockwise.
    fn angle(&self) -> f32;

    /// Camera tilt in radians.
    fn pitch(&self) -> f32;

    /// Viewport size in CSS pixels.
    fn size(&self) -> [f32; 2];

    fn camera_to_center_distance(&self) -> f32;

    /// Clip-space units per CSS pixel, per axis.
    fn pixels_to_gl_units(&self) -> [f32; 2];

    /// Tile space to clip space. `aligned` snaps the translation to whole pixels.
    fn pos_matrix(&self, tile: &UnwrappedTileId, aligned: bool) -> Mat4;

    /// Ideal tiles covering the viewport at this zoom.
    fn covering_tiles(&self, tile_size: u32) -> Vec<OverscaledTileId>;

    /// Zoom at which a source with `tile_size` tiles is ideally drawn.
    fn covering_zoom_level(&self, tile_size: u32, round_zoom: bool) -> f32 {
        let z = self.zoom() + (512.0 / tile_size as f32).log2();
        let z = if round_zoom { z.round() } else { z.floor() };
        z.max(0.0)
    }

    /// Viewport pixels to label-plane pixels.
    fn label_plane_matrix(&self) -> Mat4;

    /// Label-plane pixels to clip space.
    fn gl_coord_matrix(&self) -> Mat4;
}
