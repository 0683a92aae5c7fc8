use super::types::CompareFunc;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthMask {
    ReadOnly,
    ReadWrite,
}

/// Depth test descriptor for one draw call.
///
/// `range` maps clip-space depth into this slice of the depth buffer; the
/// painter hands every (layer, sublayer) pair its own slice.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthMode {
    pub func: CompareFunc,
    pub mask: DepthMask,
    pub range: [f32; 2],
}

impl DepthMode {
    pub const DISABLED: DepthMode = DepthMode {
        func: CompareFunc::Always,
        mask: DepthMask::ReadOnly,
        range: [0.0, 1.0],
    };

    #[inline]
    pub const fn new(func: CompareFunc, mask: DepthMask, range: [f32; 2]) -> Self {
        Self { func, mask, range }
    }

    #[inline]
    pub fn read_only(func: CompareFunc, range: [f32; 2]) -> Self {
        Self::new(func, DepthMask::ReadOnly, range)
    }

    #[inline]
    pub fn read_write(func: CompareFunc, range: [f32; 2]) -> Self {
        Self::new(func, DepthMask::ReadWrite, range)
    }

    /// True when the depth test can be switched off entirely.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.func == CompareFunc::Always && self.mask == DepthMask::ReadOnly
    }
}
