//! Kinematics and keyframe interpolation for skeletal motion capture.
//!
//! This crate provides the numerical core for working with mocap data:
//!
//! - [`skeleton`]: bone hierarchy with per-bone rotational degrees of freedom
//! - [`fk`]: forward kinematics from a posture to world-space bone tips
//! - [`ik`]: Jacobian pseudoinverse IK for bone chains
//! - [`interpolation`]: linear and Bezier keyframe interpolation in Euler
//!   angle or quaternion space, with optional IK correction
//!
//! File formats live in the `asf-amc` crate.
//!
//! # Examples
//!
//! ```
//! use glam::DVec3;
//! use mocap_kinematics::ik::{BoneChain, IkSolver};
//! use mocap_kinematics::skeleton::{BoneSpec, RotationalDofs, SkeletonBuilder};
//! use mocap_kinematics::Posture;
//!
//! let z_only = RotationalDofs::new(false, false, true);
//! let mut builder = SkeletonBuilder::new(DVec3::ZERO, RotationalDofs::ALL);
//! let upper = builder.add_bone(BoneSpec::new("upper", DVec3::X, 1.0).with_dofs(z_only));
//! let lower = builder.add_bone(BoneSpec::new("lower", DVec3::X, 1.0).with_dofs(z_only));
//! builder.attach(0, upper)?;
//! builder.attach(upper, lower)?;
//! let skeleton = builder.build()?;
//!
//! let solution = IkSolver::default().solve(
//!     &skeleton,
//!     &skeleton.dof_mask(),
//!     BoneChain::new(upper, lower),
//!     DVec3::new(1.0, 1.0, 0.0),
//!     &Posture::rest(skeleton.bone_count()),
//! )?;
//! assert!(solution.converged);
//! # Ok::<(), mocap_kinematics::KinematicsError>(())
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod fk;
pub mod ik;
pub mod interpolation;
pub mod posture;
pub mod quaternion;
pub mod rotation;
pub mod skeleton;

pub use error::{KinematicsError, Result};
pub use fk::{BoneTips, compute_tip_positions};
pub use ik::{BoneChain, IkSolution, IkSolver, IkSolverConfig, Limb, LimbChain};
pub use interpolation::{
    AngleRepresentation, IkCorrection, InterpolationType, Interpolator, InterpolatorConfig,
    KeyframeSchedule,
};
pub use posture::{Motion, Posture};
pub use quaternion::Quaternion;
pub use rotation::{Axis, euler_to_rotation, rotation_to_euler};
pub use skeleton::{Bone, BoneSpec, DofMask, RotationalDofs, Skeleton, SkeletonBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
