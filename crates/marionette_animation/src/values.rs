use glam::{Quat, Vec3, Vec4};

/// Values that can be blended between two keyframes.
pub trait Interpolatable: Copy {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Cubic Hermite segment from `v0` to `v1`. Tangents are per tick and
    /// get scaled by the segment length `dt`; `t` is normalised to `[0, 1)`.
    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self;
}

/// Hermite basis weights for `(v0, m0, v1, m1)`.
fn hermite(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let h01 = 3.0 * t2 - 2.0 * t3;
    let h11 = t3 - t2;
    [1.0 - h01, h11 - t2 + t, h01, h11]
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [a, b, c, d] = hermite(t);
        a * v0 + b * out_tangent0 * dt + c * v1 + d * in_tangent1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [a, b, c, d] = hermite(t);
        v0 * a + out_tangent0 * (b * dt) + v1 * c + in_tangent1 * (d * dt)
    }
}

impl Interpolatable for Quat {
    /// Shortest-path spherical interpolation, re-normalised.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t).normalize()
    }

    /// Component-wise spline, re-normalised.
    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [a, b, c, d] = hermite(t);
        let blended = Vec4::from(v0) * a
            + Vec4::from(out_tangent0) * (b * dt)
            + Vec4::from(v1) * c
            + Vec4::from(in_tangent1) * (d * dt);
        Quat::from_vec4(blended).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quat_slerp_takes_short_path() {
        let a = Quat::IDENTITY;
        // Same orientation as a 90 degree turn, but with a negated sign.
        let b = -Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let mid = Quat::interpolate_linear(a, b, 0.5);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        assert!(mid.dot(expected).abs() > 0.9999);
        assert!((mid.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hermite_hits_both_ends() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 9.0);
        let m = Vec3::splat(7.0);
        assert!(Vec3::interpolate_cubic(a, m, m, b, 0.0, 2.0).abs_diff_eq(a, 1e-6));
        assert!(Vec3::interpolate_cubic(a, m, m, b, 1.0, 2.0).abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn quat_cubic_stays_unit_length() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_x(1.0);
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        let mid = Quat::interpolate_cubic(a, zero, zero, b, 0.5, 4.0);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!(mid.angle_between(Quat::from_rotation_x(0.5)) < 1e-3);
    }
}
