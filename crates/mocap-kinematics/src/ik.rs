//! Inverse kinematics for bone chains
//!
//! The solver moves the tip of a chain's end bone toward a goal position by
//! repeatedly linearizing forward kinematics. Each iteration builds a 3×n
//! Jacobian by forward differences over the chain's free rotation axes,
//! solves `J θ = V` in the least-squares sense with the SVD pseudoinverse,
//! and takes a damped step along `θ`. The best posture seen so far is
//! returned when the iteration cap is reached.

use crate::error::{KinematicsError, Result};
use crate::fk::compute_tip_positions;
use crate::posture::Posture;
use crate::rotation::Axis;
use crate::skeleton::{DofMask, Skeleton};
use glam::DVec3;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Chain of bones from `start` down to `end`, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneChain {
    pub start: usize,
    pub end: usize,
}

impl BoneChain {
    /// Create a chain
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for BoneChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// One rotational unknown: an axis of a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeAxis {
    pub bone: usize,
    pub axis: Axis,
}

/// List the free rotation axes of a chain
///
/// Bones are visited from `chain.start` down to `chain.end`, and within a
/// bone the axes come in x, y, z order. Only axes enabled in `dof_mask`
/// are returned.
pub fn free_axes(
    skeleton: &Skeleton,
    dof_mask: &DofMask,
    chain: BoneChain,
) -> Result<Vec<FreeAxis>> {
    if dof_mask.len() != skeleton.bone_count() {
        return Err(KinematicsError::BoneCountMismatch {
            expected: skeleton.bone_count(),
            found: dof_mask.len(),
        });
    }

    let path = skeleton.chain(chain.start, chain.end)?;
    let mut axes = Vec::new();
    for bone in path {
        let dofs = dof_mask.get(bone).ok_or(KinematicsError::UnknownBone(bone))?;
        axes.extend(dofs.axes().map(|axis| FreeAxis { bone, axis }));
    }
    Ok(axes)
}

/// Solver tuning
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct IkSolverConfig {
    /// Finite-difference perturbation, degrees
    pub delta: f64,
    /// Fraction of the pseudoinverse step applied per iteration
    pub step_size: f64,
    /// Iteration cap
    pub max_iterations: usize,
    /// Tip distance below which the goal counts as reached
    pub accepted_error: f64,
    /// Singular values below this fraction of the largest are dropped
    pub pinv_tolerance: f64,
}

impl Default for IkSolverConfig {
    fn default() -> Self {
        Self {
            delta: 0.01,
            step_size: 0.05,
            max_iterations: 300,
            accepted_error: 0.025,
            pinv_tolerance: 1e-6,
        }
    }
}

impl IkSolverConfig {
    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "IK delta must be positive, got {}",
                self.delta
            )));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "IK step size must be positive, got {}",
                self.step_size
            )));
        }
        if self.max_iterations == 0 {
            return Err(KinematicsError::InvalidConfiguration(
                "IK needs at least one iteration".to_string(),
            ));
        }
        if self.accepted_error.is_nan() || self.accepted_error < 0.0 {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "IK accepted error must not be negative, got {}",
                self.accepted_error
            )));
        }
        if self.pinv_tolerance.is_nan() || self.pinv_tolerance < 0.0 {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "pseudoinverse tolerance must not be negative, got {}",
                self.pinv_tolerance
            )));
        }
        Ok(())
    }
}

/// Result of a solve
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution {
    /// Best posture found
    pub posture: Posture,
    /// Distance from the end bone's tip to the goal at `posture`
    pub residual: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether `residual` is within the accepted error
    pub converged: bool,
}

/// Jacobian pseudoinverse IK solver
#[derive(Debug, Clone, Default)]
pub struct IkSolver {
    config: IkSolverConfig,
}

impl IkSolver {
    /// Create a solver
    pub fn new(config: IkSolverConfig) -> Self {
        Self { config }
    }

    /// Solver settings
    pub fn config(&self) -> &IkSolverConfig {
        &self.config
    }

    /// Move the tip of `chain.end` toward `goal`
    ///
    /// Forward kinematics is evaluated on `skeleton`, while only the axes
    /// enabled in `dof_mask` are varied. Running out of iterations is not an
    /// error: the lowest-residual posture seen is returned with
    /// `converged == false`.
    pub fn solve(
        &self,
        skeleton: &Skeleton,
        dof_mask: &DofMask,
        chain: BoneChain,
        goal: DVec3,
        initial: &Posture,
    ) -> Result<IkSolution> {
        self.config.validate()?;
        let axes = free_axes(skeleton, dof_mask, chain)?;
        let end = chain.end;

        let mut posture = initial.clone();

        if axes.is_empty() {
            let residual = goal.distance(compute_tip_positions(skeleton, &posture)?[end]);
            log::debug!("IK chain {chain} has no free axes, residual {residual:.4}");
            return Ok(IkSolution {
                posture,
                residual,
                iterations: 0,
                converged: residual < self.config.accepted_error,
            });
        }

        let delta = self.config.delta;
        let mut best_posture = posture.clone();
        let mut best_residual = f64::INFINITY;

        for iteration in 0..self.config.max_iterations {
            let tip = compute_tip_positions(skeleton, &posture)?[end];
            let error = goal - tip;
            let residual = error.length();
            if residual < best_residual {
                best_residual = residual;
                best_posture.clone_from(&posture);
            }

            log::trace!("IK chain {chain} iteration {iteration}: residual {residual:.6}");

            if residual < self.config.accepted_error {
                log::debug!(
                    "IK chain {chain} converged in {iteration} iterations, residual {residual:.4}"
                );
                return Ok(IkSolution {
                    posture,
                    residual,
                    iterations: iteration,
                    converged: true,
                });
            }

            let mut jacobian = DMatrix::<f64>::zeros(3, axes.len());
            for (column, free) in axes.iter().enumerate() {
                let mut perturbed = posture.clone();
                perturbed.bone_rotations[free.bone][free.axis.index()] += delta;
                let moved = compute_tip_positions(skeleton, &perturbed)?[end];
                let derivative = (moved - tip) / delta;
                jacobian[(0, column)] = derivative.x;
                jacobian[(1, column)] = derivative.y;
                jacobian[(2, column)] = derivative.z;
            }

            let error = DVector::from_column_slice(&[error.x, error.y, error.z]);
            let theta = self.pseudo_inverse_step(jacobian, &error);

            for (free, step) in axes.iter().zip(theta.iter()) {
                posture.bone_rotations[free.bone][free.axis.index()] +=
                    step * self.config.step_size;
            }
        }

        log::debug!(
            "IK chain {chain} stopped after {} iterations, best residual {best_residual:.4}",
            self.config.max_iterations
        );

        Ok(IkSolution {
            posture: best_posture,
            residual: best_residual,
            iterations: self.config.max_iterations,
            converged: false,
        })
    }

    /// `J⁺ V`, or zero when `J` has no usable singular values
    fn pseudo_inverse_step(&self, jacobian: DMatrix<f64>, error: &DVector<f64>) -> DVector<f64> {
        let unknowns = jacobian.ncols();
        let svd = jacobian.svd(true, true);

        let sigma_max = svd.singular_values.max();
        if sigma_max.is_nan() || sigma_max <= 0.0 {
            return DVector::zeros(unknowns);
        }

        match svd.pseudo_inverse(self.config.pinv_tolerance * sigma_max) {
            Ok(pinv) => pinv * error,
            Err(err) => {
                log::trace!("pseudoinverse failed: {err}");
                DVector::zeros(unknowns)
            }
        }
    }
}

/// A limb of a humanoid skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Limb {
    LeftLeg,
    RightLeg,
    LeftArm,
    RightArm,
}

impl Limb {
    /// All limbs in solve order
    pub const ALL: [Limb; 4] = [Limb::LeftLeg, Limb::RightLeg, Limb::LeftArm, Limb::RightArm];

    /// Start and end bone names in the CMU skeleton
    pub const fn cmu_bone_names(self) -> (&'static str, &'static str) {
        match self {
            Limb::LeftLeg => ("lfemur", "lfoot"),
            Limb::RightLeg => ("rfemur", "rfoot"),
            Limb::LeftArm => ("lhumerus", "lhand"),
            Limb::RightArm => ("rhumerus", "rhand"),
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limb::LeftLeg => write!(f, "left leg"),
            Limb::RightLeg => write!(f, "right leg"),
            Limb::LeftArm => write!(f, "left arm"),
            Limb::RightArm => write!(f, "right arm"),
        }
    }
}

/// A limb and the bone chain that drives it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct LimbChain {
    pub limb: Limb,
    pub chain: BoneChain,
}

impl LimbChain {
    /// Chains by bone index for the standard 31-bone CMU skeleton
    pub const CMU_DEFAULT: [LimbChain; 4] = [
        LimbChain {
            limb: Limb::LeftLeg,
            chain: BoneChain::new(2, 4),
        },
        LimbChain {
            limb: Limb::RightLeg,
            chain: BoneChain::new(7, 9),
        },
        LimbChain {
            limb: Limb::LeftArm,
            chain: BoneChain::new(18, 21),
        },
        LimbChain {
            limb: Limb::RightArm,
            chain: BoneChain::new(25, 28),
        },
    ];

    /// Look up the four limb chains by CMU bone name
    pub fn resolve(skeleton: &Skeleton) -> Result<Vec<LimbChain>> {
        Limb::ALL
            .iter()
            .map(|&limb| {
                let (start_name, end_name) = limb.cmu_bone_names();
                let lookup = |name: &str| {
                    skeleton.bone_index(name).ok_or_else(|| {
                        KinematicsError::InvalidSkeleton(format!(
                            "no bone named '{name}' for the {limb}"
                        ))
                    })
                };
                let chain = BoneChain::new(lookup(start_name)?, lookup(end_name)?);
                skeleton.chain(chain.start, chain.end)?;
                Ok(LimbChain { limb, chain })
            })
            .collect()
    }

    /// Resolve by name, falling back to [`LimbChain::CMU_DEFAULT`]
    ///
    /// The fallback is only used when every default chain is valid on
    /// `skeleton`.
    pub fn for_skeleton(skeleton: &Skeleton) -> Result<Vec<LimbChain>> {
        match Self::resolve(skeleton) {
            Ok(chains) => Ok(chains),
            Err(err) => {
                log::debug!("Named limb lookup failed ({err}), trying default bone indices");
                for limb in &Self::CMU_DEFAULT {
                    skeleton.chain(limb.chain.start, limb.chain.end)?;
                }
                Ok(Self::CMU_DEFAULT.to_vec())
            }
        }
    }
}
