//! Skeleton hierarchy
//!
//! A [`Skeleton`] is an arena of [`Bone`]s addressed by dense integer
//! indices. Bone 0 is the root. Each bone links to its parent, its first
//! child and its next sibling by index; the order of children follows the
//! order in which they were attached, and depth-first traversal always
//! visits a bone's children before its later siblings.
//!
//! Skeletons are assembled with [`SkeletonBuilder`], which also precomputes
//! the posture-independent geometry: bone directions in local coordinates
//! and each bone's rotation into its parent's coordinate system.

use crate::error::{KinematicsError, Result};
use crate::rotation::{Axis, euler_to_rotation};
use glam::{DMat3, DVec3};

/// Rotational degrees of freedom of one bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationalDofs {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl RotationalDofs {
    /// No rotational freedom
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };

    /// Free rotation about all three axes
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };

    /// Create a DOF set
    pub const fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    /// Whether rotation about `axis` is allowed
    pub const fn contains(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Enabled axes in XYZ order
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(|axis| self.contains(*axis))
    }

    /// Number of enabled axes
    pub fn count(&self) -> usize {
        self.axes().count()
    }

    /// Zero out the components of `angles` whose axis is locked
    pub fn mask(&self, angles: DVec3) -> DVec3 {
        DVec3::new(
            if self.x { angles.x } else { 0.0 },
            if self.y { angles.y } else { 0.0 },
            if self.z { angles.z } else { 0.0 },
        )
    }
}

/// Snapshot of every bone's rotational DOFs
///
/// Taken from a skeleton before its DOFs are relaxed, so the IK solver can
/// keep moving only the joints that were free in the source data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct DofMask {
    dofs: Vec<RotationalDofs>,
}

impl DofMask {
    /// Create a mask from per-bone DOFs
    pub fn new(dofs: Vec<RotationalDofs>) -> Self {
        Self { dofs }
    }

    /// DOFs of one bone
    pub fn get(&self, bone: usize) -> Option<RotationalDofs> {
        self.dofs.get(bone).copied()
    }

    /// Number of bones covered
    pub fn len(&self) -> usize {
        self.dofs.len()
    }

    /// Whether the mask covers no bones
    pub fn is_empty(&self) -> bool {
        self.dofs.is_empty()
    }
}

/// A bone in the skeleton arena
#[derive(Debug, Clone)]
pub struct Bone {
    index: usize,
    name: Option<String>,
    parent: Option<usize>,
    child: Option<usize>,
    sibling: Option<usize>,
    /// Unit direction from this bone's origin to its child's, in local coordinates
    direction: DVec3,
    length: f64,
    /// Local axis orientation, degrees, XYZ order
    axis: DVec3,
    /// Rotation from this bone's local coordinates to its parent's
    rot_parent: DMat3,
    dofs: RotationalDofs,
}

impl Bone {
    /// Bone index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bone name, if it has one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parent bone index (None for the root)
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// First child bone index
    pub fn child(&self) -> Option<usize> {
        self.child
    }

    /// Next sibling bone index
    pub fn sibling(&self) -> Option<usize> {
        self.sibling
    }

    /// Unit rest direction in local coordinates
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Bone length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Local axis orientation in degrees
    pub fn axis(&self) -> DVec3 {
        self.axis
    }

    /// Rotation from local to parent coordinates
    pub fn rot_parent(&self) -> DMat3 {
        self.rot_parent
    }

    /// Rotational DOFs currently active on this bone
    pub fn dofs(&self) -> RotationalDofs {
        self.dofs
    }

    /// Offset from this bone's origin to its tip, in local coordinates
    pub fn offset(&self) -> DVec3 {
        self.direction * self.length
    }
}

/// Description of a bone to add to a [`SkeletonBuilder`]
#[derive(Debug, Clone, Default)]
pub struct BoneSpec {
    pub name: Option<String>,
    /// Rest direction in global coordinates; normalized on build
    pub direction: DVec3,
    pub length: f64,
    /// Local axis orientation, degrees, XYZ order
    pub axis: DVec3,
    pub dofs: RotationalDofs,
}

impl BoneSpec {
    /// Create a named bone with the given global direction and length
    pub fn new(name: impl Into<String>, direction: DVec3, length: f64) -> Self {
        Self {
            name: Some(name.into()),
            direction,
            length,
            axis: DVec3::ZERO,
            dofs: RotationalDofs::NONE,
        }
    }

    /// Set the local axis orientation
    pub fn with_axis(mut self, axis: DVec3) -> Self {
        self.axis = axis;
        self
    }

    /// Set the rotational DOFs
    pub fn with_dofs(mut self, dofs: RotationalDofs) -> Self {
        self.dofs = dofs;
        self
    }
}

/// Incremental skeleton construction
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use mocap_kinematics::skeleton::{BoneSpec, RotationalDofs, SkeletonBuilder};
///
/// let mut builder = SkeletonBuilder::new(DVec3::ZERO, RotationalDofs::ALL);
/// let upper = builder.add_bone(
///     BoneSpec::new("upper", DVec3::X, 1.0).with_dofs(RotationalDofs::new(false, false, true)),
/// );
/// let lower = builder.add_bone(BoneSpec::new("lower", DVec3::X, 1.0));
/// builder.attach(0, upper)?;
/// builder.attach(upper, lower)?;
/// let skeleton = builder.build()?;
///
/// assert_eq!(skeleton.bone_count(), 3);
/// assert_eq!(skeleton.bone_index("lower"), Some(2));
/// # Ok::<(), mocap_kinematics::KinematicsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SkeletonBuilder {
    specs: Vec<BoneSpec>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl SkeletonBuilder {
    /// Start a skeleton whose root has the given axis orientation and DOFs
    pub fn new(root_axis: DVec3, root_dofs: RotationalDofs) -> Self {
        let root = BoneSpec {
            name: Some("root".to_string()),
            direction: DVec3::ZERO,
            length: 0.0,
            axis: root_axis,
            dofs: root_dofs,
        };

        Self {
            specs: vec![root],
            parents: vec![None],
            children: vec![Vec::new()],
        }
    }

    /// Add a bone and return its index
    ///
    /// Indices are assigned densely in insertion order, starting at 1.
    pub fn add_bone(&mut self, spec: BoneSpec) -> usize {
        self.specs.push(spec);
        self.parents.push(None);
        self.children.push(Vec::new());
        self.specs.len() - 1
    }

    /// Make `child` the next child of `parent`
    pub fn attach(&mut self, parent: usize, child: usize) -> Result<()> {
        let count = self.specs.len();
        if parent >= count {
            return Err(KinematicsError::UnknownBone(parent));
        }
        if child >= count {
            return Err(KinematicsError::UnknownBone(child));
        }
        if child == 0 {
            return Err(KinematicsError::InvalidSkeleton(
                "the root bone cannot have a parent".to_string(),
            ));
        }
        if let Some(existing) = self.parents[child] {
            return Err(KinematicsError::InvalidSkeleton(format!(
                "bone {child} is already attached to bone {existing}"
            )));
        }

        self.parents[child] = Some(parent);
        self.children[parent].push(child);
        Ok(())
    }

    /// Number of bones added so far, including the root
    pub fn bone_count(&self) -> usize {
        self.specs.len()
    }

    /// Look up a bone added so far by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.specs
            .iter()
            .position(|spec| spec.name.as_deref() == Some(name))
    }

    /// Validate the hierarchy and precompute bone geometry
    pub fn build(self) -> Result<Skeleton> {
        let count = self.specs.len();

        // Every bone must hang off the root
        let mut reachable = vec![false; count];
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            reachable[index] = true;
            stack.extend(self.children[index].iter().copied());
        }
        if let Some(orphan) = reachable.iter().position(|r| !r) {
            return Err(KinematicsError::InvalidSkeleton(format!(
                "bone {orphan} is not connected to the root"
            )));
        }

        let axis_rotations: Vec<DMat3> = self
            .specs
            .iter()
            .map(|spec| euler_to_rotation(spec.axis))
            .collect();

        let mut bones = Vec::with_capacity(count);
        for (index, spec) in self.specs.into_iter().enumerate() {
            let parent = self.parents[index];
            let child = self.children[index].first().copied();
            let sibling = parent.and_then(|p| {
                let siblings = &self.children[p];
                let position = siblings.iter().position(|&c| c == index)?;
                siblings.get(position + 1).copied()
            });

            let axis_rotation = axis_rotations[index];
            let rot_parent = match parent {
                Some(p) => axis_rotations[p].transpose() * axis_rotation,
                None => axis_rotation,
            };

            let direction = axis_rotation.transpose() * spec.direction.normalize_or_zero();

            bones.push(Bone {
                index,
                name: spec.name,
                parent,
                child,
                sibling,
                direction,
                length: spec.length,
                axis: spec.axis,
                rot_parent,
                dofs: spec.dofs,
            });
        }

        log::debug!("Built skeleton with {} bones", bones.len());

        Ok(Skeleton { bones })
    }
}

/// Immutable bone hierarchy
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Index of the root bone
    pub const ROOT: usize = 0;

    /// Number of bones, including the root
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// All bones in index order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// The root bone
    pub fn root(&self) -> &Bone {
        &self.bones[Self::ROOT]
    }

    /// Bone by index
    pub fn bone(&self, index: usize) -> Result<&Bone> {
        self.bones
            .get(index)
            .ok_or(KinematicsError::UnknownBone(index))
    }

    /// Bone index by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name() == Some(name))
    }

    /// Children of a bone in attachment order
    pub fn children(&self, index: usize) -> Children<'_> {
        Children {
            skeleton: self,
            next: self.bones.get(index).and_then(|bone| bone.child),
        }
    }

    /// Bone indices in depth-first order, children before siblings
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.bones.len());
        let mut stack = vec![Self::ROOT];
        while let Some(index) = stack.pop() {
            order.push(index);
            let children: Vec<usize> = self.children(index).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Path of bones from `start` down to `end`, both inclusive
    ///
    /// Fails with [`KinematicsError::InvalidChain`] when `start` is not an
    /// ancestor of (or equal to) `end`.
    pub fn chain(&self, start: usize, end: usize) -> Result<Vec<usize>> {
        self.bone(start)?;
        let mut current = self.bone(end)?;

        let mut path = vec![end];
        while current.index != start {
            match current.parent {
                Some(parent) => {
                    path.push(parent);
                    current = &self.bones[parent];
                }
                None => return Err(KinematicsError::InvalidChain { start, end }),
            }
        }

        path.reverse();
        Ok(path)
    }

    /// Snapshot of the current rotational DOFs
    pub fn dof_mask(&self) -> DofMask {
        DofMask::new(self.bones.iter().map(|bone| bone.dofs).collect())
    }

    /// Mark every rotational axis of every bone as free
    ///
    /// Take a [`Skeleton::dof_mask`] snapshot first if the original DOFs are
    /// still needed.
    pub fn enable_all_rotational_dofs(&mut self) {
        for bone in &mut self.bones {
            bone.dofs = RotationalDofs::ALL;
        }
    }

    /// Copy of this skeleton with every rotational axis free
    pub fn relaxed(&self) -> Self {
        let mut skeleton = self.clone();
        skeleton.enable_all_rotational_dofs();
        skeleton
    }
}

/// Iterator over the children of a bone
pub struct Children<'a> {
    skeleton: &'a Skeleton,
    next: Option<usize>,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.skeleton.bones[current].sibling;
        Some(current)
    }
}
