//! Forward kinematics
//!
//! [`compute_tip_positions`] walks the skeleton depth-first and composes,
//! for every bone, the parent's world transform with the bone's fixed
//! rotation into parent coordinates, the posture's joint rotation about the
//! bone's own axes, and the translation along the bone. The transformed
//! origin is the bone's tip in world space.
//!
//! The evaluator is a pure function of `(skeleton, posture)`: nothing is
//! cached between calls, so the same skeleton can be shared by concurrent
//! evaluations.

use crate::error::{KinematicsError, Result};
use crate::posture::Posture;
use crate::rotation::euler_to_rotation;
use crate::skeleton::Skeleton;
use glam::{DAffine3, DVec3};
use std::ops::Index;

/// World-space tip position of every bone, indexed by bone index
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTips {
    positions: Vec<DVec3>,
}

impl BoneTips {
    /// Tip position of one bone
    pub fn get(&self, bone: usize) -> Option<DVec3> {
        self.positions.get(bone).copied()
    }

    /// All tip positions in bone index order
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no bones
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Index<usize> for BoneTips {
    type Output = DVec3;

    fn index(&self, bone: usize) -> &DVec3 {
        &self.positions[bone]
    }
}

/// Compute the world-space tip position of every bone
///
/// Only the rotation axes enabled on the skeleton contribute; a locked
/// axis is evaluated as 0°.
pub fn compute_tip_positions(skeleton: &Skeleton, posture: &Posture) -> Result<BoneTips> {
    let bone_count = skeleton.bone_count();
    if posture.bone_count() != bone_count {
        return Err(KinematicsError::BoneCountMismatch {
            expected: bone_count,
            found: posture.bone_count(),
        });
    }

    let mut positions = vec![DVec3::ZERO; bone_count];
    let mut stack = vec![(
        Skeleton::ROOT,
        DAffine3::from_translation(posture.root_position),
    )];

    while let Some((index, parent_world)) = stack.pop() {
        let bone = &skeleton.bones()[index];

        let joint = euler_to_rotation(bone.dofs().mask(posture.bone_rotations[index]));
        let local = DAffine3::from_mat3(bone.rot_parent() * joint)
            * DAffine3::from_translation(bone.offset());
        let world = parent_world * local;

        positions[index] = world.translation;

        // Siblings share the parent's transform; children get ours
        stack.extend(skeleton.children(index).map(|child| (child, world)));
    }

    Ok(BoneTips { positions })
}

/// Tip position of a single bone
pub fn tip_position(skeleton: &Skeleton, posture: &Posture, bone: usize) -> Result<DVec3> {
    skeleton.bone(bone)?;
    let tips = compute_tip_positions(skeleton, posture)?;
    Ok(tips[bone])
}
