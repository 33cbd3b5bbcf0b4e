//! Unit quaternions for joint rotation interpolation
//!
//! Conversions to and from Euler angles always go through the rotation
//! matrix form in [`crate::rotation`], so Euler/quaternion consistency is
//! exactly as good as the matrix conversions.

use crate::rotation::{euler_to_rotation, rotation_to_euler};
use glam::{DMat3, DVec3};
use std::ops::{Add, Mul, Neg};

/// Above this cosine the endpoints are close enough that slerp falls back to
/// a normalized linear blend
const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

/// Quaternion `s + xi + yj + zk`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Identity rotation
    pub const IDENTITY: Self = Self {
        s: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new quaternion
    pub const fn new(s: f64, x: f64, y: f64, z: f64) -> Self {
        Self { s, x, y, z }
    }

    /// 4-D dot product
    pub fn dot(&self, other: &Self) -> f64 {
        self.s * other.s + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length; a zero quaternion becomes the identity
    pub fn normalize(&self) -> Self {
        let len = self.norm();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Component-wise linear blend `a·(1-t) + b·t`
    ///
    /// The result is not unit length; callers normalize it.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        *self * (1.0 - t) + *other * t
    }

    /// Spherical linear interpolation along the shorter arc
    ///
    /// `t` outside `[0, 1]` extrapolates along the same great circle, which
    /// is what [`Quaternion::double`] and the Bezier control points rely on.
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        let mut cos_theta = self.dot(other);
        let mut end = *other;

        if cos_theta < 0.0 {
            end = -end;
            cos_theta = -cos_theta;
        }

        if cos_theta > SLERP_LINEAR_THRESHOLD {
            return self.lerp(&end, t).normalize();
        }

        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let w_start = ((1.0 - t) * theta).sin() / sin_theta;
        let w_end = (t * theta).sin() / sin_theta;

        (*self * w_start + end * w_end).normalize()
    }

    /// Reflect `self` through `other`: `slerp(self, other, 2)`
    pub fn double(&self, other: &Self) -> Self {
        self.slerp(other, 2.0)
    }

    /// Convert a rotation matrix to a unit quaternion
    pub fn from_rotation_matrix(m: &DMat3) -> Self {
        // Row/column naming: mRC is row R, column C
        let m00 = m.x_axis.x;
        let m10 = m.x_axis.y;
        let m20 = m.x_axis.z;
        let m01 = m.y_axis.x;
        let m11 = m.y_axis.y;
        let m21 = m.y_axis.z;
        let m02 = m.z_axis.x;
        let m12 = m.z_axis.y;
        let m22 = m.z_axis.z;

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let k = 0.5 / (trace + 1.0).sqrt();
            Self::new(0.25 / k, (m21 - m12) * k, (m02 - m20) * k, (m10 - m01) * k)
        } else if m00 > m11 && m00 > m22 {
            let k = 0.5 / (1.0 + m00 - m11 - m22).sqrt();
            Self::new((m21 - m12) * k, 0.25 / k, (m01 + m10) * k, (m02 + m20) * k)
        } else if m11 > m22 {
            let k = 0.5 / (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m02 - m20) * k, (m01 + m10) * k, 0.25 / k, (m12 + m21) * k)
        } else {
            let k = 0.5 / (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m10 - m01) * k, (m02 + m20) * k, (m12 + m21) * k, 0.25 / k)
        };

        q.normalize()
    }

    /// Convert to a rotation matrix
    pub fn to_rotation_matrix(&self) -> DMat3 {
        let Self { s, x, y, z } = self.normalize();

        DMat3::from_cols(
            DVec3::new(
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + s * z),
                2.0 * (x * z - s * y),
            ),
            DVec3::new(
                2.0 * (x * y - s * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + s * x),
            ),
            DVec3::new(
                2.0 * (x * z + s * y),
                2.0 * (y * z - s * x),
                1.0 - 2.0 * (x * x + y * y),
            ),
        )
    }

    /// Convert XYZ Euler angles in degrees to a quaternion
    pub fn from_euler(angles: DVec3) -> Self {
        Self::from_rotation_matrix(&euler_to_rotation(angles))
    }

    /// Convert to XYZ Euler angles in degrees
    pub fn to_euler(&self) -> DVec3 {
        rotation_to_euler(&self.to_rotation_matrix())
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.s + rhs.s, self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.s * rhs, self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.s, -self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn assert_quat_close(a: Quaternion, b: Quaternion, eps: f64) {
        // q and -q are the same rotation
        let same = (a.s - b.s).abs() < eps
            && (a.x - b.x).abs() < eps
            && (a.y - b.y).abs() < eps
            && (a.z - b.z).abs() < eps;
        let flipped = (a.s + b.s).abs() < eps
            && (a.x + b.x).abs() < eps
            && (a.y + b.y).abs() < eps
            && (a.z + b.z).abs() < eps;
        assert!(same || flipped, "expected {b:?}, got {a:?}");
    }

    fn z_rotation(degrees: f64) -> Quaternion {
        let half = degrees.to_radians() / 2.0;
        Quaternion::new(half.cos(), 0.0, 0.0, half.sin())
    }

    #[test]
    fn test_normalize() {
        let q = Quaternion::new(1.0, 1.0, 1.0, 1.0).normalize();
        assert!((q.norm() - 1.0).abs() < 1e-12);
        assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize(), Quaternion::IDENTITY);
    }

    #[test_case(0.0)]
    #[test_case(0.3)]
    #[test_case(1.0)]
    #[test_case(2.0)]
    fn test_slerp_same_endpoint(t: f64) {
        let q = Quaternion::from_euler(DVec3::new(20.0, -35.0, 70.0));
        let r = q.slerp(&q, t);
        assert_quat_close(r, q, 1e-12);
        assert!((r.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = Quaternion::from_euler(DVec3::new(10.0, 20.0, 30.0));
        let b = Quaternion::from_euler(DVec3::new(-60.0, 45.0, 100.0));
        assert_quat_close(a.slerp(&b, 0.0), a, 1e-12);
        assert_quat_close(b.slerp(&b, 1.0), b, 1e-12);
        assert_quat_close(a.slerp(&b, 1.0), b, 1e-12);
    }

    #[test]
    fn test_slerp_midpoint_about_single_axis() {
        let a = z_rotation(0.0);
        let b = z_rotation(90.0);
        let mid = a.slerp(&b, 0.5);
        assert_quat_close(mid, z_rotation(45.0), 1e-12);
        assert!((mid.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slerp_takes_shorter_arc() {
        let a = z_rotation(10.0);
        // Same rotation as z_rotation(30) but in the opposite hemisphere
        let b = -z_rotation(30.0);
        assert!(a.dot(&b) < 0.0);
        let mid = a.slerp(&b, 0.5);
        assert_quat_close(mid, z_rotation(20.0), 1e-12);
    }

    #[test]
    fn test_slerp_nearly_equal_uses_linear_blend() {
        let a = z_rotation(10.0);
        let b = z_rotation(10.5);
        let mid = a.slerp(&b, 0.5);
        assert!((mid.norm() - 1.0).abs() < 1e-12);
        assert_quat_close(mid, z_rotation(10.25), 1e-6);
    }

    #[test]
    fn test_double_reflects_through_endpoint() {
        let p = z_rotation(10.0);
        let q = z_rotation(40.0);
        assert_quat_close(p.double(&q), z_rotation(70.0), 1e-12);
    }

    #[test]
    fn test_euler_round_trip() {
        let angles = DVec3::new(12.1, 19.0, -51.7);
        let back = Quaternion::from_euler(angles).to_euler();
        assert!((back - angles).abs().max_element() < 1e-9);
    }

    #[test]
    fn test_matrix_round_trip_all_branches() {
        // Exercise the trace branch and each of the diagonal branches
        for angles in [
            DVec3::new(5.0, 10.0, 15.0),
            DVec3::new(170.0, 0.0, 0.0),
            DVec3::new(0.0, 170.0, 0.0),
            DVec3::new(0.0, 0.0, 170.0),
        ] {
            let m = euler_to_rotation(angles);
            let q = Quaternion::from_rotation_matrix(&m);
            assert!(q.to_rotation_matrix().abs_diff_eq(m, 1e-12));
        }
    }
}
