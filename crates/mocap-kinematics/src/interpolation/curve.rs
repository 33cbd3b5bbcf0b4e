//! Interpolation primitives shared by the linear and Bezier curves
//!
//! Curves are written once against [`Lerp`]. Euler angles blend as plain
//! vectors; quaternions implement `lerp` as slerp, so every curve built on
//! top of it becomes its spherical counterpart automatically.

use crate::posture::Posture;
use crate::quaternion::Quaternion;
use glam::DVec3;

/// Types that can be blended by a scalar parameter
///
/// `t` is not clamped: values outside `[0, 1]` extrapolate, which the
/// Bezier control point construction depends on.
pub trait Lerp: Clone {
    /// Blend from `self` (t = 0) to `other` (t = 1)
    fn lerp(&self, other: &Self, t: f64) -> Self;

    /// Reflect `self` through `other`
    fn double(&self, other: &Self) -> Self {
        self.lerp(other, 2.0)
    }
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Lerp for DVec3 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        *self * (1.0 - t) + *other * t
    }
}

impl Lerp for Quaternion {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self.slerp(other, t)
    }

    fn double(&self, other: &Self) -> Self {
        Quaternion::double(self, other)
    }
}

/// Working representation of a joint rotation during interpolation
pub trait AngleSpace: Lerp + Send + Sync {
    /// Convert from XYZ Euler degrees
    fn from_euler(angles: DVec3) -> Self;

    /// Convert back to XYZ Euler degrees
    fn to_euler(&self) -> DVec3;
}

impl AngleSpace for DVec3 {
    fn from_euler(angles: DVec3) -> Self {
        angles
    }

    fn to_euler(&self) -> DVec3 {
        *self
    }
}

impl AngleSpace for Quaternion {
    fn from_euler(angles: DVec3) -> Self {
        Quaternion::from_euler(angles)
    }

    fn to_euler(&self) -> DVec3 {
        Quaternion::to_euler(self)
    }
}

/// A keyframe posture converted into the working angle representation
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPose<T> {
    pub root: DVec3,
    pub bones: Vec<T>,
}

impl<T: AngleSpace> KeyPose<T> {
    pub fn from_posture(posture: &Posture) -> Self {
        Self {
            root: posture.root_position,
            bones: posture
                .bone_rotations
                .iter()
                .map(|&angles| T::from_euler(angles))
                .collect(),
        }
    }

    pub fn to_posture(&self) -> Posture {
        Posture {
            root_position: self.root,
            bone_rotations: self.bones.iter().map(AngleSpace::to_euler).collect(),
        }
    }
}

impl<T: Lerp> Lerp for KeyPose<T> {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            root: Lerp::lerp(&self.root, &other.root, t),
            bones: self
                .bones
                .iter()
                .zip(&other.bones)
                .map(|(a, b)| a.lerp(b, t))
                .collect(),
        }
    }

    fn double(&self, other: &Self) -> Self {
        Self {
            root: Lerp::double(&self.root, &other.root),
            bones: self
                .bones
                .iter()
                .zip(&other.bones)
                .map(|(a, b)| a.double(b))
                .collect(),
        }
    }
}

/// Evaluate the cubic curve `(p1, a, b, p2)` at `t` by De Casteljau's construction
pub fn de_casteljau<T: Lerp>(p1: &T, a: &T, b: &T, p2: &T, t: f64) -> T {
    let q0 = p1.lerp(a, t);
    let q1 = a.lerp(b, t);
    let q2 = b.lerp(p2, t);
    let r0 = q0.lerp(&q1, t);
    let r1 = q1.lerp(&q2, t);
    r0.lerp(&r1, t)
}
