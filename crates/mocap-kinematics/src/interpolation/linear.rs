//! Linear segments

use super::curve::Lerp;

/// Straight blend between two adjacent keyframes
#[derive(Debug, Clone, Copy)]
pub struct LinearSegment<'a, T> {
    start: &'a T,
    end: &'a T,
}

impl<'a, T: Lerp> LinearSegment<'a, T> {
    /// Segment from `keys[index]` to `keys[index + 1]`
    ///
    /// Returns `None` when `index + 1` is out of range.
    pub fn new(keys: &'a [T], index: usize) -> Option<Self> {
        Some(Self {
            start: keys.get(index)?,
            end: keys.get(index + 1)?,
        })
    }

    /// Value at local parameter `t`
    pub fn evaluate(&self, t: f64) -> T {
        self.start.lerp(self.end, t)
    }
}
