use crate::color::Color;
use crate::math::{mat3_mul_vec3, mat3_rotation, spherical_to_cartesian};

use super::property::TranslateAnchor;

/// Global light used to shade extrusions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub anchor: TranslateAnchor,
    /// `[radial, azimuthal°, polar°]`.
    pub position: [f32; 3],
    pub color: Color,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            anchor: TranslateAnchor::Viewport,
            position: [1.15, 210.0, 30.0],
            color: Color::WHITE,
            intensity: 0.5,
        }
    }
}

impl Light {
    /// Light direction in tile space for a map rotated by `bearing` radians.
    pub fn direction(&self, bearing: f32) -> [f32; 3] {
        let position = spherical_to_cartesian(self.position);
        if self.anchor == TranslateAnchor::Viewport {
            mat3_mul_vec3(&mat3_rotation(-bearing), position)
        } else {
            position
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_anchor_ignores_bearing() {
        let light = Light {
            anchor: TranslateAnchor::Map,
            ..Light::default()
        };
        assert_eq!(light.direction(1.0), light.direction(0.0));
    }

    #[test]
    fn viewport_anchor_counter_rotates() {
        let light = Light::default();
        let a = light.direction(0.0);
        let b = light.direction(std::f32::consts::PI);
        assert!((a[0] + b[0]).abs() < 1e-5);
        assert!((a[1] + b[1]).abs() < 1e-5);
        assert!((a[2] - b[2]).abs() < 1e-5);
    }
}
