//! Euler angle and rotation matrix conversions
//!
//! All Euler angles are in degrees and use XYZ order: the rotation about X
//! is applied first, then Y, then Z, so the composed matrix is
//! `R = Rz * Ry * Rx`. This is the convention used by ASF/AMC files.

use glam::{DMat3, DVec3};
use std::fmt;

/// Local rotation axis of a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in XYZ order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis in a rotation vector
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Build a rotation matrix from XYZ Euler angles in degrees
pub fn euler_to_rotation(angles: DVec3) -> DMat3 {
    let rx = DMat3::from_rotation_x(angles.x.to_radians());
    let ry = DMat3::from_rotation_y(angles.y.to_radians());
    let rz = DMat3::from_rotation_z(angles.z.to_radians());
    rz * ry * rx
}

/// Extract XYZ Euler angles in degrees from a rotation matrix
///
/// Near gimbal lock (the Y angle close to ±90°) the Z angle is fixed at 0
/// and the X angle absorbs the remaining rotation.
pub fn rotation_to_euler(r: &DMat3) -> DVec3 {
    // glam matrices are column-major: r.x_axis is column 0 = (R00, R10, R20)
    let r00 = r.x_axis.x;
    let r10 = r.x_axis.y;
    let r20 = r.x_axis.z;
    let r11 = r.y_axis.y;
    let r21 = r.y_axis.z;
    let r12 = r.z_axis.y;
    let r22 = r.z_axis.z;

    let cy = (r00 * r00 + r10 * r10).sqrt();

    let (x, y, z) = if cy > 16.0 * f64::EPSILON {
        (r21.atan2(r22), (-r20).atan2(cy), r10.atan2(r00))
    } else {
        ((-r12).atan2(r11), (-r20).atan2(cy), 0.0)
    };

    DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn assert_vec_close(a: DVec3, b: DVec3, eps: f64) {
        assert!(
            (a - b).abs().max_element() < eps,
            "expected {b:?}, got {a:?}"
        );
    }

    #[test]
    fn test_identity() {
        let r = euler_to_rotation(DVec3::ZERO);
        assert!(r.abs_diff_eq(DMat3::IDENTITY, 1e-12));
        assert_vec_close(rotation_to_euler(&DMat3::IDENTITY), DVec3::ZERO, 1e-12);
    }

    #[test]
    fn test_application_order() {
        // Rotating +X by 90 degrees about Z lands on +Y; the X rotation applied
        // first leaves +X untouched.
        let r = euler_to_rotation(DVec3::new(45.0, 0.0, 90.0));
        let v = r * DVec3::X;
        assert_vec_close(v, DVec3::Y, 1e-12);

        // Y then Z: +Z rotated 90 about Y becomes +X, then 90 about Z becomes +Y
        let r = euler_to_rotation(DVec3::new(0.0, 90.0, 90.0));
        assert_vec_close(r * DVec3::Z, DVec3::Y, 1e-12);
    }

    #[test_case(DVec3::new(12.1, 19.0, 8.3) ; "small angles")]
    #[test_case(DVec3::new(-170.0, 45.0, 120.0) ; "large x and z")]
    #[test_case(DVec3::new(30.0, -89.0, -60.0) ; "near gimbal")]
    #[test_case(DVec3::new(0.0, 0.0, -179.5) ; "z only")]
    fn test_round_trip(angles: DVec3) {
        let r = euler_to_rotation(angles);
        let back = rotation_to_euler(&r);
        assert_vec_close(back, angles, 1e-9);
    }

    #[test]
    fn test_round_trip_wraps_equivalent_rotation() {
        // -351.7 degrees about Z comes back as the equivalent 8.3 degrees
        let angles = DVec3::new(12.1, 19.0, -351.7);
        let back = rotation_to_euler(&euler_to_rotation(angles));
        assert_vec_close(back, DVec3::new(12.1, 19.0, 8.3), 1e-9);
    }

    #[test]
    fn test_gimbal_lock_branch() {
        let angles = DVec3::new(30.0, 90.0, 0.0);
        let r = euler_to_rotation(angles);
        let back = rotation_to_euler(&r);
        assert!((back.y - 90.0).abs() < 1e-6);
        assert_eq!(back.z, 0.0);
        // The recovered angles describe the same rotation
        assert!(euler_to_rotation(back).abs_diff_eq(r, 1e-9));
    }

    #[test]
    fn test_axis_index() {
        assert_eq!(Axis::X.index(), 0);
        assert_eq!(Axis::Y.index(), 1);
        assert_eq!(Axis::Z.index(), 2);
        assert_eq!(Axis::Z.to_string(), "z");
    }
}
