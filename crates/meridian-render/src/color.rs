/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are expected to be multiplied by `a` (premultiplied alpha).
///
/// Paint colors, blend constants and clear colors all use this representation,
/// so the same value can be forwarded to uniforms and to the blend unit.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_premul(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);

    /// Creates a premultiplied color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: (r.clamp(0.0, 1.0)) * a,
            g: (g.clamp(0.0, 1.0)) * a,
            b: (b.clamp(0.0, 1.0)) * a,
            a,
        }
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_straight_premultiplies() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn to_straight_round_trips_opaque() {
        let c = Color::from_srgb_u8(255, 0, 0, 255);
        assert_eq!(c.to_straight(), (1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn to_straight_of_transparent_is_zero() {
        assert_eq!(Color::TRANSPARENT.to_straight(), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn opacity_check() {
        assert!(Color::BLACK.is_opaque());
        assert!(!Color::from_straight(0.0, 0.0, 0.0, 0.99).is_opaque());
    }
}
