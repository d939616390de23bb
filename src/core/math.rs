//! Angle arithmetic for planar pose estimation.
//!
//! Headings live on a circle; every comparison or difference in this crate
//! goes through these helpers rather than naive subtraction.

use std::f32::consts::PI;

/// Normalize an angle to [-π, π].
///
/// # Example
/// ```
/// use dhruva_mcl::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) + PI).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Signed shortest rotation from angle `a` to angle `b`.
///
/// # Example
/// ```
/// use dhruva_mcl::math::angle_diff;
/// use std::f32::consts::PI;
///
/// // Crossing the ±π seam takes the short way around
/// assert!((angle_diff(PI - 0.05, -PI + 0.05) - 0.1).abs() < 1e-6);
/// ```
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(b - a)
}

/// Interpolate between two angles along the shortest arc.
///
/// `t = 0` returns `a`, `t = 1` returns `b`.
#[inline]
pub fn angle_lerp(a: f32, b: f32, t: f32) -> f32 {
    normalize_angle(a + angle_diff(a, b) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_is_identity_inside_range() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(1.2), 1.2);
        assert_relative_eq!(normalize_angle(-2.9), -2.9);
    }

    #[test]
    fn normalize_wraps_multiples_of_tau() {
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(-4.0 * PI), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(5.0 * PI), PI, epsilon = 1e-5);
    }

    #[test]
    fn normalize_just_past_boundary() {
        let result = normalize_angle(PI + 0.01);
        assert!(result < 0.0, "should wrap negative: {result}");
        assert_relative_eq!(result, -PI + 0.01, epsilon = 1e-5);

        let result = normalize_angle(-PI - 0.01);
        assert!(result > 0.0, "should wrap positive: {result}");
        assert_relative_eq!(result, PI - 0.01, epsilon = 1e-5);
    }

    #[test]
    fn diff_takes_shortest_path_across_seam() {
        assert_relative_eq!(angle_diff(PI - 0.1, -PI + 0.1), 0.2, epsilon = 1e-6);
        assert_relative_eq!(angle_diff(-PI + 0.1, PI - 0.1), -0.2, epsilon = 1e-6);
    }

    #[test]
    fn diff_plain_cases() {
        assert_relative_eq!(angle_diff(0.0, PI / 2.0), PI / 2.0);
        assert_relative_eq!(angle_diff(PI / 2.0, 0.0), -PI / 2.0);
        assert_relative_eq!(angle_diff(1.0, 1.0), 0.0);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_relative_eq!(angle_lerp(0.0, 1.0, 0.0), 0.0);
        assert_relative_eq!(angle_lerp(0.0, 1.0, 1.0), 1.0);
        assert_relative_eq!(angle_lerp(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn lerp_crosses_seam() {
        let mid = angle_lerp(PI - 0.1, -PI + 0.1, 0.5);
        assert!(mid.abs() > PI - 1e-4, "midpoint should sit on the seam: {mid}");
    }
}
