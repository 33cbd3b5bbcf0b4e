//! Keyframe schedules

use crate::error::{KinematicsError, Result};

/// Strictly increasing list of keyframe indices
///
/// A schedule is never empty. Whether it fits a particular motion is
/// checked with [`KeyframeSchedule::check_fits`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyframeSchedule {
    frames: Vec<usize>,
}

impl KeyframeSchedule {
    /// Keyframe every `skip + 1` frames, starting at frame 0
    ///
    /// ```
    /// use mocap_kinematics::interpolation::KeyframeSchedule;
    ///
    /// let schedule = KeyframeSchedule::uniform(9, 41)?;
    /// assert_eq!(schedule.frames(), &[0, 10, 20, 30, 40]);
    /// # Ok::<(), mocap_kinematics::KinematicsError>(())
    /// ```
    pub fn uniform(skip: usize, frame_count: usize) -> Result<Self> {
        if frame_count == 0 {
            return Err(KinematicsError::InvalidConfiguration(
                "cannot schedule keyframes for an empty motion".to_string(),
            ));
        }

        let frames = (0..frame_count).step_by(skip.saturating_add(1)).collect();
        Ok(Self { frames })
    }

    /// Schedule from an explicit frame list
    pub fn from_frames(frames: Vec<usize>) -> Result<Self> {
        if frames.is_empty() {
            return Err(KinematicsError::InvalidConfiguration(
                "keyframe list is empty".to_string(),
            ));
        }
        if let Some(pair) = frames.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "keyframes must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { frames })
    }

    /// Fail unless every keyframe lies inside a motion of `frame_count` frames
    pub fn check_fits(&self, frame_count: usize) -> Result<()> {
        if self.last() >= frame_count {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "keyframe {} is outside a motion of {frame_count} frames",
                self.last()
            )));
        }
        Ok(())
    }

    /// Keyframe indices in increasing order
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the schedule has no keyframes (never true for a constructed schedule)
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First keyframe
    pub fn first(&self) -> usize {
        self.frames[0]
    }

    /// Last keyframe
    pub fn last(&self) -> usize {
        self.frames[self.frames.len() - 1]
    }

    /// Adjacent keyframe pairs `(k_n, k_n+1)`
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.frames.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
