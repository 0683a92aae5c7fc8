use std::fmt;

/// Frame phase. Fixed order: offscreen, opaque, translucent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderPass {
    /// Intermediate textures consumed later in the frame.
    Offscreen,
    /// Fully opaque geometry, top layer first, depth-tested.
    Opaque,
    /// Everything blended, bottom layer first.
    Translucent,
}

impl fmt::Display for RenderPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderPass::Offscreen => "offscreen",
            RenderPass::Opaque => "opaque",
            RenderPass::Translucent => "translucent",
        })
    }
}
