//! Column-major matrix helpers in the layout shaders expect.

use crate::gl::Mat4;

pub fn mat4_identity() -> Mat4 {
    let mut m = [0.0; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

/// Orthographic projection.
pub fn mat4_ortho(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Mat4 {
    let lr = 1.0 / (left - right);
    let bt = 1.0 / (bottom - top);
    let nf = 1.0 / (near - far);
    let mut m = [0.0f32; 16];
    m[0] = (-2.0 * lr) as f32;
    m[5] = (-2.0 * bt) as f32;
    m[10] = (2.0 * nf) as f32;
    m[12] = ((left + right) * lr) as f32;
    m[13] = ((top + bottom) * bt) as f32;
    m[14] = ((far + near) * nf) as f32;
    m[15] = 1.0;
    m
}

/// `m · T(v)`.
pub fn mat4_translate(m: &Mat4, v: [f32; 3]) -> Mat4 {
    let [x, y, z] = v;
    let mut out = *m;
    for i in 0..4 {
        out[12 + i] = m[i] * x + m[4 + i] * y + m[8 + i] * z + m[12 + i];
    }
    out
}

/// `m · S(v)`.
pub fn mat4_scale(m: &Mat4, v: [f32; 3]) -> Mat4 {
    let mut out = *m;
    for i in 0..4 {
        out[i] = m[i] * v[0];
        out[4 + i] = m[4 + i] * v[1];
        out[8 + i] = m[8 + i] * v[2];
    }
    out
}

/// `a · b`.
pub fn mat4_multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0f32; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}

/// `m · Rz(angle)`.
pub fn mat4_rotate_z(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let mut out = *m;
    for i in 0..4 {
        out[i] = m[i] * c + m[4 + i] * s;
        out[4 + i] = m[4 + i] * c - m[i] * s;
    }
    out
}

/// Rotation about the z axis, as a column-major 3×3.
pub fn mat3_rotation(angle: f32) -> [f32; 9] {
    let (s, c) = angle.sin_cos();
    [c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0]
}

/// `m · v` for a column-major 3×3.
pub fn mat3_mul_vec3(m: &[f32; 9], v: [f32; 3]) -> [f32; 3] {
    [
        m[0] * v[0] + m[3] * v[1] + m[6] * v[2],
        m[1] * v[0] + m[4] * v[1] + m[7] * v[2],
        m[2] * v[0] + m[5] * v[1] + m[8] * v[2],
    ]
}

/// 2D rotation of `v` by `angle` radians.
pub fn rotate_vec2(v: [f32; 2], angle: f32) -> [f32; 2] {
    let (s, c) = angle.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1]]
}

/// Spherical `[r, azimuthal°, polar°]` to cartesian, azimuth measured from north.
pub fn spherical_to_cartesian([r, azimuthal, polar]: [f32; 3]) -> [f32; 3] {
    let azimuthal = (azimuthal + 90.0).to_radians();
    let polar = polar.to_radians();
    [
        r * azimuthal.cos() * polar.sin(),
        r * azimuthal.sin() * polar.sin(),
        r * polar.cos(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn translate_moves_origin() {
        let m = mat4_translate(&mat4_identity(), [3.0, -2.0, 1.0]);
        assert_eq!(&m[12..16], &[3.0, -2.0, 1.0, 1.0]);
    }

    #[test]
    fn ortho_maps_corners_to_ndc() {
        let m = mat4_ortho(0.0, 8192.0, -8192.0, 0.0, 0.0, 1.0);
        // x = 8192 -> 1, y = 0 -> 1
        assert!(approx(m[0] * 8192.0 + m[12], 1.0));
        assert!(approx(m[13], 1.0));
        assert!(approx(m[5] * -8192.0 + m[13], -1.0));
    }

    #[test]
    fn spherical_light_points_up_at_zero_polar() {
        let v = spherical_to_cartesian([1.0, 0.0, 0.0]);
        assert!(approx(v[2], 1.0));
        assert!(approx(v[0], 0.0));
    }

    #[test]
    fn multiply_composes_translations() {
        let a = mat4_translate(&mat4_identity(), [1.0, 2.0, 0.0]);
        let b = mat4_translate(&mat4_identity(), [3.0, 4.0, 0.0]);
        let m = mat4_multiply(&a, &b);
        assert_eq!(&m[12..14], &[4.0, 6.0]);
        assert_eq!(mat4_multiply(&mat4_identity(), &a), a);
    }

    #[test]
    fn rotate_z_then_translate_matches_rotated_offset() {
        let m = mat4_rotate_z(&mat4_identity(), std::f32::consts::FRAC_PI_2);
        let t = mat4_translate(&m, [1.0, 0.0, 0.0]);
        assert!(approx(t[12], 0.0) && approx(t[13], 1.0));
    }

    #[test]
    fn rotation_quarter_turn() {
        let r = rotate_vec2([1.0, 0.0], std::f32::consts::FRAC_PI_2);
        assert!(approx(r[0], 0.0) && approx(r[1], 1.0));
    }
}
