use nalgebra::{Vector2, Vector3};

/// Hermite smoothstep on `t`, clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Unit forward vector for a heading (radians). Heading 0 faces +Z.
#[inline]
pub fn forward_from_heading(heading: f32) -> Vector3<f32> {
    Vector3::new(heading.sin(), 0.0, heading.cos())
}

/// Unit right vector for a heading, perpendicular to [`forward_from_heading`] in XZ.
#[inline]
pub fn right_from_heading(heading: f32) -> Vector2<f32> {
    Vector2::new(heading.cos(), -heading.sin())
}

/// Distance from point `p` to the segment `a..b` in the XZ plane.
pub fn dist_to_segment(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    let nearest = a + ab * t;
    (p - nearest).norm()
}

/// `1 - e^(-rate * dt)`: the lerp factor that makes exponential smoothing frame-rate independent.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt.max(0.0)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_is_clamped_and_symmetric() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1.0e-6);
        assert!((smoothstep(0.25) + smoothstep(0.75) - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn forward_and_right_are_orthonormal() {
        for h in [0.0_f32, 0.3, 1.7, -2.4, 3.1] {
            let f = forward_from_heading(h);
            let r = right_from_heading(h);
            assert!((f.norm() - 1.0).abs() < 1.0e-6);
            assert!((r.norm() - 1.0).abs() < 1.0e-6);
            assert!((f.x * r.x + f.z * r.y).abs() < 1.0e-6);
        }
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);
        assert!((dist_to_segment(Vector2::new(5.0, 3.0), a, b) - 3.0).abs() < 1.0e-6);
        assert!((dist_to_segment(Vector2::new(-4.0, 3.0), a, b) - 5.0).abs() < 1.0e-6);
        assert!((dist_to_segment(Vector2::new(1.0, 1.0), a, a) - 2f32.sqrt()).abs() < 1.0e-6);
    }

    #[test]
    fn smoothing_factor_bounds() {
        assert_eq!(smoothing_factor(5.0, 0.0), 0.0);
        let f = smoothing_factor(5.0, 1.0 / 60.0);
        assert!(f > 0.0 && f < 1.0);
        assert!(smoothing_factor(5.0, 100.0) > 0.999);
    }
}
