// src/vec2.rs

/// 2D dot product.
#[inline]
pub fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Scalar 2D cross product a × b (z-component of the 3D cross product).
#[inline]
pub fn cross(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

#[inline]
pub fn norm(v: [f64; 2]) -> f64 {
    dot(v, v).sqrt()
}

/// Rotate `v` by `theta`: (cos θ·x + sin θ·y, −sin θ·x + cos θ·y).
///
/// Positive θ turns clockwise, so (1, 0) by π/2 lands on (0, −1).
#[inline]
pub fn rotate(v: [f64; 2], theta: f64) -> [f64; 2] {
    let (s, c) = theta.sin_cos();
    [c * v[0] + s * v[1], -s * v[0] + c * v[1]]
}

#[inline]
pub fn add(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

#[inline]
pub fn scale(k: f64, v: [f64; 2]) -> [f64; 2] {
    [k * v[0], k * v[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotation_sign_convention_is_clockwise() {
        let r = rotate([1.0, 0.0], FRAC_PI_2);
        assert_abs_diff_eq!(r[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[1], -1.0, epsilon = 1e-15);

        let r = rotate([0.0, 1.0], FRAC_PI_2);
        assert_abs_diff_eq!(r[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r[1], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn rotation_preserves_norm_for_large_angles() {
        let v = [0.3, -0.7];
        for &theta in &[1e-6, 0.5, PI, 17.0, -123.4, 1e6] {
            assert_abs_diff_eq!(norm(rotate(v, theta)), norm(v), epsilon = 1e-12);
        }
    }

    #[test]
    fn cross_is_antisymmetric() {
        let a = [1.0, 2.0];
        let b = [-3.0, 0.5];
        assert_eq!(cross(a, b), -cross(b, a));
        assert_eq!(cross([1.0, 0.0], [0.0, 1.0]), 1.0);
    }
}
