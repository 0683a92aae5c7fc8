//! Translation of the state value objects into wgpu pipeline descriptors.
//!
//! wgpu bakes depth, stencil, blend and cull state into the render pipeline,
//! so a wgpu-backed [`Backend`](super::Backend) keys its pipelines on these
//! values. Depth ranges and blend constants are dynamic pass state.
//!
//! The [`Context`](super::Context) forwards each state change to the backend,
//! which keeps the current modes and resolves them when a draw arrives:
//!
//! ```ignore
//! fn draw_elements(&mut self, primitive: Primitive, first: u32, count: u32) {
//!     let key = (self.program, primitive, self.depth, self.stencil, self.color, self.cull);
//!     let pipeline = self.pipelines.entry(key).or_insert_with(|| {
//!         let (front_face, cull_mode) = wgpu_state::cull_state(&self.cull);
//!         let target = wgpu::ColorTargetState {
//!             format: self.surface_format,
//!             blend: wgpu_state::blend_state(&self.color),
//!             write_mask: wgpu_state::color_writes(self.color.mask),
//!         };
//!         // depth_compare / depth_write_enabled / stencil_state feed the
//!         // pipeline's depth-stencil descriptor.
//!         build_pipeline(&self.device, target, front_face, cull_mode, &self.depth, &self.stencil)
//!     });
//!     let (min_depth, max_depth) = wgpu_state::viewport_depth(&self.depth);
//!     pass.set_viewport(x, y, w, h, min_depth, max_depth);
//!     pass.set_blend_constant(wgpu_state::blend_constant(&self.color));
//!     pass.set_stencil_reference(self.stencil.reference);
//!     pass.set_pipeline(pipeline);
//!     pass.draw_indexed(first..first + count, 0, 0..1);
//! }
//! ```

use super::color_mode::{ColorMask, ColorMode};
use super::cull_face_mode::CullFaceMode;
use super::depth_mode::{DepthMask, DepthMode};
use super::stencil_mode::StencilMode;
use super::types::{
    BlendFactor, CompareFunc, Face, Primitive, StencilOp, TextureFilter, TextureFormat,
    TextureWrap, Winding,
};

impl From<CompareFunc> for wgpu::CompareFunction {
    fn from(f: CompareFunc) -> Self {
        match f {
            CompareFunc::Never => wgpu::CompareFunction::Never,
            CompareFunc::Less => wgpu::CompareFunction::Less,
            CompareFunc::Equal => wgpu::CompareFunction::Equal,
            CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunc::Greater => wgpu::CompareFunction::Greater,
            CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunc::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl From<StencilOp> for wgpu::StencilOperation {
    fn from(op: StencilOp) -> Self {
        match op {
            StencilOp::Keep => wgpu::StencilOperation::Keep,
            StencilOp::Zero => wgpu::StencilOperation::Zero,
            StencilOp::Replace => wgpu::StencilOperation::Replace,
            StencilOp::Increment => wgpu::StencilOperation::IncrementClamp,
            StencilOp::IncrementWrap => wgpu::StencilOperation::IncrementWrap,
            StencilOp::Decrement => wgpu::StencilOperation::DecrementClamp,
            StencilOp::DecrementWrap => wgpu::StencilOperation::DecrementWrap,
            StencilOp::Invert => wgpu::StencilOperation::Invert,
        }
    }
}

impl From<BlendFactor> for wgpu::BlendFactor {
    fn from(f: BlendFactor) -> Self {
        match f {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DstColor => wgpu::BlendFactor::Dst,
            BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
            BlendFactor::ConstantColor => wgpu::BlendFactor::Constant,
            BlendFactor::OneMinusConstantColor => wgpu::BlendFactor::OneMinusConstant,
        }
    }
}

impl From<Primitive> for wgpu::PrimitiveTopology {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Primitive::Lines => wgpu::PrimitiveTopology::LineList,
            Primitive::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        }
    }
}

impl From<TextureFilter> for wgpu::FilterMode {
    fn from(f: TextureFilter) -> Self {
        match f {
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
            TextureFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl From<TextureWrap> for wgpu::AddressMode {
    fn from(w: TextureWrap) -> Self {
        match w {
            TextureWrap::Clamp => wgpu::AddressMode::ClampToEdge,
            TextureWrap::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

impl From<TextureFormat> for wgpu::TextureFormat {
    fn from(f: TextureFormat) -> Self {
        match f {
            TextureFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Alpha8 => wgpu::TextureFormat::R8Unorm,
        }
    }
}

// ── depth / stencil ──────────────────────────────────────────────────────

#[inline]
pub fn depth_compare(mode: &DepthMode) -> wgpu::CompareFunction {
    mode.func.into()
}

#[inline]
pub fn depth_write_enabled(mode: &DepthMode) -> bool {
    mode.mask == DepthMask::ReadWrite
}

/// Viewport `(min_depth, max_depth)` emulating the depth range.
#[inline]
pub fn viewport_depth(mode: &DepthMode) -> (f32, f32) {
    (mode.range[0], mode.range[1])
}

/// Same face state front and back; the stencil reference is set on the pass.
pub fn stencil_state(mode: &StencilMode) -> wgpu::StencilState {
    if mode.is_disabled() {
        return wgpu::StencilState::default();
    }
    let face = wgpu::StencilFaceState {
        compare: mode.test.func.into(),
        fail_op: mode.fail.into(),
        depth_fail_op: mode.depth_fail.into(),
        pass_op: mode.pass.into(),
    };
    wgpu::StencilState {
        front: face,
        back: face,
        read_mask: mode.test.mask,
        write_mask: mode.write_mask,
    }
}

// ── color ────────────────────────────────────────────────────────────────

/// `None` disables blending.
pub fn blend_state(mode: &ColorMode) -> Option<wgpu::BlendState> {
    if mode.is_unblended() {
        return None;
    }
    let component = wgpu::BlendComponent {
        src_factor: mode.blend_function.src.into(),
        dst_factor: mode.blend_function.dst.into(),
        operation: wgpu::BlendOperation::Add,
    };
    Some(wgpu::BlendState {
        color: component,
        alpha: component,
    })
}

pub fn color_writes(mask: ColorMask) -> wgpu::ColorWrites {
    let [r, g, b, a] = mask.0;
    let mut writes = wgpu::ColorWrites::empty();
    if r {
        writes |= wgpu::ColorWrites::RED;
    }
    if g {
        writes |= wgpu::ColorWrites::GREEN;
    }
    if b {
        writes |= wgpu::ColorWrites::BLUE;
    }
    if a {
        writes |= wgpu::ColorWrites::ALPHA;
    }
    writes
}

pub fn blend_constant(mode: &ColorMode) -> wgpu::Color {
    let c = mode.blend_color;
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

// ── culling ──────────────────────────────────────────────────────────────

/// `(front_face, cull_mode)`. wgpu cannot cull both faces; that case culls nothing.
pub fn cull_state(mode: &CullFaceMode) -> (wgpu::FrontFace, Option<wgpu::Face>) {
    let front = match mode.winding {
        Winding::Clockwise => wgpu::FrontFace::Cw,
        Winding::CounterClockwise => wgpu::FrontFace::Ccw,
    };
    if !mode.enabled {
        return (front, None);
    }
    let face = match mode.face {
        Face::Front => Some(wgpu::Face::Front),
        Face::Back => Some(wgpu::Face::Back),
        Face::FrontAndBack => None,
    };
    (front, face)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_test_maps_to_equal_keep() {
        let s = stencil_state(&StencilMode::clip_test(4));
        assert_eq!(s.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(s.front.pass_op, wgpu::StencilOperation::Keep);
        assert_eq!(s.read_mask, 0xFF);
        assert_eq!(s.write_mask, 0);
    }

    #[test]
    fn disabled_stencil_is_default_state() {
        assert_eq!(stencil_state(&StencilMode::DISABLED), wgpu::StencilState::default());
    }

    #[test]
    fn unblended_has_no_blend_state() {
        assert!(blend_state(&ColorMode::UNBLENDED).is_none());
        let alpha = blend_state(&ColorMode::ALPHA_BLENDED);
        assert_eq!(
            alpha.map(|b| b.color.dst_factor),
            Some(wgpu::BlendFactor::OneMinusSrcAlpha)
        );
    }

    #[test]
    fn color_mask_translates_per_channel() {
        assert_eq!(color_writes(ColorMask::ALL), wgpu::ColorWrites::ALL);
        assert_eq!(color_writes(ColorMask::NONE), wgpu::ColorWrites::empty());
        assert_eq!(
            color_writes(ColorMask([true, false, false, true])),
            wgpu::ColorWrites::RED | wgpu::ColorWrites::ALPHA
        );
    }

    #[test]
    fn back_ccw_culls_back() {
        assert_eq!(
            cull_state(&CullFaceMode::BACK_CCW),
            (wgpu::FrontFace::Ccw, Some(wgpu::Face::Back))
        );
        assert_eq!(cull_state(&CullFaceMode::DISABLED).1, None);
    }

    #[test]
    fn depth_helpers() {
        let mode = DepthMode::read_write(CompareFunc::LessEqual, [0.2, 0.8]);
        assert_eq!(depth_compare(&mode), wgpu::CompareFunction::LessEqual);
        assert!(depth_write_enabled(&mode));
        assert_eq!(viewport_depth(&mode), (0.2, 0.8));
    }
}
