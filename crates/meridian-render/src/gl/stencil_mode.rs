use super::types::{CompareFunc, StencilOp};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StencilTest {
    pub func: CompareFunc,
    pub mask: u32,
}

/// Stencil test plus the ops applied on fail / depth-fail / pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StencilMode {
    pub test: StencilTest,
    pub reference: u32,
    pub write_mask: u32,
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
}

impl StencilMode {
    pub const DISABLED: StencilMode = StencilMode {
        test: StencilTest {
            func: CompareFunc::Always,
            mask: 0,
        },
        reference: 0,
        write_mask: 0,
        fail: StencilOp::Keep,
        depth_fail: StencilOp::Keep,
        pass: StencilOp::Keep,
    };

    #[inline]
    pub const fn new(
        test: StencilTest,
        reference: u32,
        write_mask: u32,
        fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    ) -> Self {
        Self {
            test,
            reference,
            write_mask,
            fail,
            depth_fail,
            pass,
        }
    }

    /// Writes `id` wherever the tile quad lands, ignoring prior contents.
    #[inline]
    pub const fn clip_mask_write(id: u32) -> Self {
        Self::new(
            StencilTest {
                func: CompareFunc::Always,
                mask: 0,
            },
            id,
            0xFF,
            StencilOp::Keep,
            StencilOp::Keep,
            StencilOp::Replace,
        )
    }

    /// Passes only where the mask holds `id`; never writes.
    #[inline]
    pub const fn clip_test(id: u32) -> Self {
        Self::new(
            StencilTest {
                func: CompareFunc::Equal,
                mask: 0xFF,
            },
            id,
            0,
            StencilOp::Keep,
            StencilOp::Keep,
            StencilOp::Keep,
        )
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.test.func == CompareFunc::Always && self.write_mask == 0
    }
}
