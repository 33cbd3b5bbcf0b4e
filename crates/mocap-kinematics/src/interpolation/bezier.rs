//! Cubic Bezier segments
//!
//! Control points are synthesized from the neighbouring keyframes so the
//! curve passes through every keyframe with a tangent that follows the
//! surrounding motion. For a segment `p1 -> p2` with neighbours `p0` and
//! `p3`:
//!
//! ```text
//! a = lerp(p1, lerp(double(p0, p1), p2, 1/2),  1/3)
//! b = lerp(p2, lerp(double(p1, p2), p3, 1/2), -1/3)
//! ```
//!
//! The first segment has no `p0` and uses `a = lerp(p1, double(p3, p2), 1/3)`;
//! the last has no `p3` and uses `b = lerp(p2, double(p0, p1), 1/3)`.

use super::curve::{Lerp, de_casteljau};

const ONE_THIRD: f64 = 1.0 / 3.0;

/// Minimum number of keyframes the control point construction needs
pub const MIN_BEZIER_KEYFRAMES: usize = 4;

/// One cubic segment between adjacent keyframes
#[derive(Debug, Clone)]
pub struct BezierSegment<T> {
    p1: T,
    a: T,
    b: T,
    p2: T,
}

impl<T: Lerp> BezierSegment<T> {
    /// Segment from `keys[index]` to `keys[index + 1]`
    ///
    /// Returns `None` when `index + 1` is out of range. A segment with no
    /// neighbour on either side degenerates to a straight line.
    pub fn new(keys: &[T], index: usize) -> Option<Self> {
        let p1 = keys.get(index)?;
        let p2 = keys.get(index + 1)?;
        let p0 = index.checked_sub(1).and_then(|i| keys.get(i));
        let p3 = keys.get(index + 2);

        let a = match (p0, p3) {
            (Some(p0), _) => p1.lerp(&p0.double(p1).lerp(p2, 0.5), ONE_THIRD),
            (None, Some(p3)) => p1.lerp(&p3.double(p2), ONE_THIRD),
            (None, None) => p1.lerp(p2, ONE_THIRD),
        };

        let b = match (p0, p3) {
            (_, Some(p3)) => p2.lerp(&p1.double(p2).lerp(p3, 0.5), -ONE_THIRD),
            (Some(p0), None) => p2.lerp(&p0.double(p1), ONE_THIRD),
            (None, None) => p2.lerp(p1, ONE_THIRD),
        };

        Some(Self {
            p1: p1.clone(),
            a,
            b,
            p2: p2.clone(),
        })
    }

    /// Synthesized control points `(a, b)`
    pub fn control_points(&self) -> (&T, &T) {
        (&self.a, &self.b)
    }

    /// Value at local parameter `t`
    pub fn evaluate(&self, t: f64) -> T {
        de_casteljau(&self.p1, &self.a, &self.b, &self.p2, t)
    }
}
