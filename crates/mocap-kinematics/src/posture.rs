//! Postures and motions

use crate::error::{KinematicsError, Result};
use glam::DVec3;

/// Skeleton pose at a single frame
///
/// Bone rotations are XYZ Euler angles in degrees, indexed by bone index.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Posture {
    /// Root position in world coordinates
    pub root_position: DVec3,
    /// Per-bone rotation, degrees
    pub bone_rotations: Vec<DVec3>,
}

impl Posture {
    /// Rest posture: root at the origin, every rotation zero
    pub fn rest(bone_count: usize) -> Self {
        Self {
            root_position: DVec3::ZERO,
            bone_rotations: vec![DVec3::ZERO; bone_count],
        }
    }

    /// Number of bones this posture describes
    pub fn bone_count(&self) -> usize {
        self.bone_rotations.len()
    }

    /// Rotation of one bone
    pub fn rotation(&self, bone: usize) -> Option<DVec3> {
        self.bone_rotations.get(bone).copied()
    }

    /// Replace the rotation of one bone
    pub fn set_rotation(&mut self, bone: usize, rotation: DVec3) -> Result<()> {
        let slot = self
            .bone_rotations
            .get_mut(bone)
            .ok_or(KinematicsError::UnknownBone(bone))?;
        *slot = rotation;
        Ok(())
    }
}

/// Fixed-length sequence of postures, one per frame
///
/// The frame count and bone count are fixed when the motion is created.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    bone_count: usize,
    frames: Vec<Posture>,
}

impl Motion {
    /// Allocate a motion filled with rest postures
    pub fn new(frame_count: usize, bone_count: usize) -> Self {
        Self {
            bone_count,
            frames: vec![Posture::rest(bone_count); frame_count],
        }
    }

    /// Build a motion from existing postures
    ///
    /// All postures must describe `bone_count` bones.
    pub fn from_frames(bone_count: usize, frames: Vec<Posture>) -> Result<Self> {
        if let Some(bad) = frames.iter().find(|p| p.bone_count() != bone_count) {
            return Err(KinematicsError::BoneCountMismatch {
                expected: bone_count,
                found: bad.bone_count(),
            });
        }
        Ok(Self { bone_count, frames })
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of bones in every posture
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Whether the motion has no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Posture at a frame
    pub fn posture(&self, frame: usize) -> Option<&Posture> {
        self.frames.get(frame)
    }

    /// Replace the posture at a frame
    pub fn set_posture(&mut self, frame: usize, posture: Posture) -> Result<()> {
        if posture.bone_count() != self.bone_count {
            return Err(KinematicsError::BoneCountMismatch {
                expected: self.bone_count,
                found: posture.bone_count(),
            });
        }
        let frame_count = self.frames.len();
        let slot = self
            .frames
            .get_mut(frame)
            .ok_or(KinematicsError::FrameOutOfRange { frame, frame_count })?;
        *slot = posture;
        Ok(())
    }

    /// All postures in frame order
    pub fn frames(&self) -> &[Posture] {
        &self.frames
    }

    /// Iterate over postures in frame order
    pub fn iter(&self) -> std::slice::Iter<'_, Posture> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a Motion {
    type Item = &'a Posture;
    type IntoIter = std::slice::Iter<'a, Posture>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
