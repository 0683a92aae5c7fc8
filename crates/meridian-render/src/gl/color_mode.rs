use crate::color::Color;

use super::types::BlendFactor;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunction {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunction {
    /// Source replaces destination; blending can be switched off.
    pub const REPLACE: BlendFunction = BlendFunction {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
    };

    #[inline]
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ColorMask(pub [bool; 4]);

impl ColorMask {
    pub const ALL: ColorMask = ColorMask([true; 4]);
    pub const NONE: ColorMask = ColorMask([false; 4]);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorMode {
    pub blend_function: BlendFunction,
    pub blend_color: Color,
    pub mask: ColorMask,
}

/// Alpha added per draw by the overdraw inspector.
const OVERDRAW_STEPS: f32 = 8.0;

impl ColorMode {
    /// Nothing reaches the color buffer.
    pub const DISABLED: ColorMode = ColorMode {
        blend_function: BlendFunction::REPLACE,
        blend_color: Color::TRANSPARENT,
        mask: ColorMask::NONE,
    };

    /// Opaque replace on every channel.
    pub const UNBLENDED: ColorMode = ColorMode {
        blend_function: BlendFunction::REPLACE,
        blend_color: Color::TRANSPARENT,
        mask: ColorMask::ALL,
    };

    /// Premultiplied source-over.
    pub const ALPHA_BLENDED: ColorMode = ColorMode {
        blend_function: BlendFunction::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
        blend_color: Color::TRANSPARENT,
        mask: ColorMask::ALL,
    };

    /// Additive coverage accumulation: every draw adds `1/8` to each channel.
    pub fn overdraw_inspector() -> Self {
        let a = 1.0 / OVERDRAW_STEPS;
        Self {
            blend_function: BlendFunction::new(BlendFactor::ConstantColor, BlendFactor::One),
            blend_color: Color::from_premul(a, a, a, 0.0),
            mask: ColorMask::ALL,
        }
    }

    /// True when blending can be switched off for this mode.
    #[inline]
    pub fn is_unblended(&self) -> bool {
        self.blend_function == BlendFunction::REPLACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdraw_inspector_accumulates_eighths() {
        let mode = ColorMode::overdraw_inspector();
        assert_eq!(mode.blend_function.src, BlendFactor::ConstantColor);
        assert_eq!(mode.blend_function.dst, BlendFactor::One);
        assert_eq!(mode.blend_color.to_array(), [0.125, 0.125, 0.125, 0.0]);
    }

    #[test]
    fn presets_differ_in_mask_and_blend() {
        assert!(ColorMode::UNBLENDED.is_unblended());
        assert!(!ColorMode::ALPHA_BLENDED.is_unblended());
        assert_eq!(ColorMode::DISABLED.mask, ColorMask::NONE);
    }
}
