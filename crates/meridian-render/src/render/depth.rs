//! Depth-range slicing so that every (layer, sublayer) pair owns a private
//! band of the depth buffer.

/// Smallest depth step that survives a 16-bit depth buffer.
pub const DEPTH_EPSILON: f64 = 1.0 / 65536.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthAllocator {
    num_sublayers: u32,
    depth_range: f64,
}

impl DepthAllocator {
    pub fn new(num_sublayers: u32, layer_count: usize) -> Self {
        let depth_range = (layer_count as f64 + 2.0) * f64::from(num_sublayers) * DEPTH_EPSILON;
        Self {
            num_sublayers,
            depth_range,
        }
    }

    #[inline]
    pub fn num_sublayers(&self) -> u32 {
        self.num_sublayers
    }

    /// Total depth span consumed by all 2D layers.
    #[inline]
    pub fn depth_range(&self) -> f64 {
        self.depth_range
    }

    /// Far depth of sublayer `n` of style layer `layer_index`.
    pub fn far(&self, layer_index: usize, sublayer: u32) -> f64 {
        let slot = (1.0 + layer_index as f64) * f64::from(self.num_sublayers) + f64::from(sublayer);
        1.0 - slot * DEPTH_EPSILON
    }

    /// `[near, far]` for sublayer `n` of style layer `layer_index`.
    pub fn interval(&self, layer_index: usize, sublayer: u32) -> [f32; 2] {
        let far = self.far(layer_index, sublayer);
        let near = far - 1.0 + self.depth_range;
        [near as f32, far as f32]
    }

    /// The depth band left for 3D layers, in front of every 2D band.
    pub fn range_for_3d(&self) -> [f32; 2] {
        [0.0, (1.0 - self.depth_range) as f32]
    }
}
