//! Keyframe interpolation
//!
//! An [`Interpolator`] rebuilds a motion from the keyframes named by a
//! [`KeyframeSchedule`]. Keyframes and every frame outside the scheduled
//! range are copied through unchanged; the frames between adjacent
//! keyframes are regenerated with a linear or cubic Bezier curve, in
//! either Euler angle or quaternion space.
//!
//! With quaternion interpolation the regenerated frames can additionally
//! be corrected with IK so the limb tips follow the original motion.
//!
//! # Example
//!
//! ```
//! use mocap_kinematics::interpolation::{
//!     AngleRepresentation, InterpolationType, Interpolator, InterpolatorConfig, KeyframeSchedule,
//! };
//! use mocap_kinematics::{Motion, Posture};
//! use glam::DVec3;
//!
//! let mut motion = Motion::new(11, 2);
//! let mut last = Posture::rest(2);
//! last.root_position = DVec3::new(10.0, 0.0, 0.0);
//! motion.set_posture(10, last)?;
//!
//! let interpolator = Interpolator::new(InterpolatorConfig {
//!     interpolation: InterpolationType::Linear,
//!     angles: AngleRepresentation::Euler,
//! });
//! let schedule = KeyframeSchedule::uniform(9, motion.frame_count())?;
//! let output = interpolator.interpolate(&motion, &schedule)?;
//!
//! assert_eq!(output.posture(5).unwrap().root_position, DVec3::new(5.0, 0.0, 0.0));
//! # Ok::<(), mocap_kinematics::KinematicsError>(())
//! ```

mod bezier;
mod curve;
mod linear;
mod schedule;

pub use bezier::{BezierSegment, MIN_BEZIER_KEYFRAMES};
pub use curve::{AngleSpace, KeyPose, Lerp, de_casteljau};
pub use linear::LinearSegment;
pub use schedule::KeyframeSchedule;

use crate::error::{KinematicsError, Result};
use crate::fk::compute_tip_positions;
use crate::ik::{IkSolver, LimbChain};
use crate::posture::{Motion, Posture};
use crate::quaternion::Quaternion;
use crate::skeleton::{DofMask, Skeleton};
use glam::DVec3;
use std::fmt;
use std::str::FromStr;

/// Curve used between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationType {
    #[default]
    Linear,
    Bezier,
}

impl FromStr for InterpolationType {
    type Err = KinematicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "linear" => Ok(Self::Linear),
            "b" | "bezier" => Ok(Self::Bezier),
            _ => Err(KinematicsError::InvalidConfiguration(format!(
                "unknown interpolation type '{s}', expected l(inear) or b(ezier)"
            ))),
        }
    }
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Bezier => write!(f, "bezier"),
        }
    }
}

/// Joint angle representation used while interpolating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum AngleRepresentation {
    #[default]
    Euler,
    Quaternion,
}

impl FromStr for AngleRepresentation {
    type Err = KinematicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "e" | "euler" => Ok(Self::Euler),
            "q" | "quaternion" => Ok(Self::Quaternion),
            _ => Err(KinematicsError::InvalidConfiguration(format!(
                "unknown angle representation '{s}', expected e(uler) or q(uaternion)"
            ))),
        }
    }
}

impl fmt::Display for AngleRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euler => write!(f, "euler"),
            Self::Quaternion => write!(f, "quaternion"),
        }
    }
}

/// Interpolation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpolatorConfig {
    pub interpolation: InterpolationType,
    pub angles: AngleRepresentation,
}

/// IK correction applied to interpolated frames
///
/// `skeleton` is the skeleton used for FK and is normally relaxed with
/// [`Skeleton::relaxed`]; `dof_mask` is the snapshot of the original DOFs
/// and decides which axes the solver may change.
#[derive(Debug, Clone)]
pub struct IkCorrection {
    pub skeleton: Skeleton,
    pub dof_mask: DofMask,
    pub chains: Vec<LimbChain>,
    pub solver: IkSolver,
}

impl IkCorrection {
    /// Correction for `skeleton` with the default solver
    ///
    /// Snapshots the skeleton's DOFs, then relaxes every rotational axis for
    /// FK. Limb chains are looked up with [`LimbChain::for_skeleton`].
    pub fn for_skeleton(skeleton: &Skeleton) -> Result<Self> {
        Ok(Self {
            skeleton: skeleton.relaxed(),
            dof_mask: skeleton.dof_mask(),
            chains: LimbChain::for_skeleton(skeleton)?,
            solver: IkSolver::default(),
        })
    }

    /// Replace the solver
    pub fn with_solver(mut self, solver: IkSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Replace the limb chains
    pub fn with_chains(mut self, chains: Vec<LimbChain>) -> Self {
        self.chains = chains;
        self
    }

    /// Pull the limb tips of `posture` toward where they are in `original`
    fn correct(&self, posture: &mut Posture, original: &Posture) -> Result<()> {
        posture.root_position = original.root_position;

        let goals = compute_tip_positions(&self.skeleton, original)?;
        for limb in &self.chains {
            let goal = goals
                .get(limb.chain.end)
                .ok_or(KinematicsError::UnknownBone(limb.chain.end))?;
            let solution =
                self.solver
                    .solve(&self.skeleton, &self.dof_mask, limb.chain, goal, posture)?;
            log::trace!(
                "IK {}: residual {:.4} after {} iterations",
                limb.limb,
                solution.residual,
                solution.iterations
            );
            *posture = solution.posture;
        }
        Ok(())
    }
}

/// A frame to regenerate: its index, its segment, and the local parameter
#[derive(Debug, Clone, Copy)]
struct FrameJob {
    frame: usize,
    segment: usize,
    t: f64,
}

/// Curve for one segment, in the working angle representation
enum SegmentCurve<'a, T> {
    Linear(LinearSegment<'a, KeyPose<T>>),
    Bezier(BezierSegment<KeyPose<T>>),
}

impl<T: Lerp> SegmentCurve<'_, T> {
    fn evaluate(&self, t: f64) -> KeyPose<T> {
        match self {
            Self::Linear(segment) => segment.evaluate(t),
            Self::Bezier(segment) => segment.evaluate(t),
        }
    }
}

/// Keyframe interpolation engine
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    config: InterpolatorConfig,
    ik: Option<IkCorrection>,
}

impl Interpolator {
    /// Create an interpolator without IK correction
    pub fn new(config: InterpolatorConfig) -> Self {
        Self { config, ik: None }
    }

    /// Enable IK correction
    ///
    /// Only applied with [`AngleRepresentation::Quaternion`].
    pub fn with_ik(mut self, ik: IkCorrection) -> Self {
        self.ik = Some(ik);
        self
    }

    /// Interpolation settings
    pub fn config(&self) -> &InterpolatorConfig {
        &self.config
    }

    /// Rebuild `input` from the keyframes in `schedule`
    ///
    /// The output has the same frame count as `input`. Scheduled keyframes
    /// and frames before the first or after the last keyframe are copied
    /// verbatim.
    pub fn interpolate(&self, input: &Motion, schedule: &KeyframeSchedule) -> Result<Motion> {
        schedule.check_fits(input.frame_count())?;

        if self.config.interpolation == InterpolationType::Bezier
            && schedule.len() < MIN_BEZIER_KEYFRAMES
        {
            return Err(KinematicsError::InsufficientKeyframes {
                required: MIN_BEZIER_KEYFRAMES,
                found: schedule.len(),
            });
        }

        let ik = match (&self.ik, self.config.angles) {
            (Some(ik), AngleRepresentation::Quaternion) => {
                if ik.skeleton.bone_count() != input.bone_count() {
                    return Err(KinematicsError::BoneCountMismatch {
                        expected: ik.skeleton.bone_count(),
                        found: input.bone_count(),
                    });
                }
                Some(ik)
            }
            (Some(_), AngleRepresentation::Euler) => {
                log::warn!(
                    "IK correction is only applied with quaternion interpolation, ignoring it"
                );
                None
            }
            (None, _) => None,
        };

        log::info!(
            "Interpolating {} frames from {} keyframes ({} {}{})",
            input.frame_count(),
            schedule.len(),
            self.config.interpolation,
            self.config.angles,
            if ik.is_some() { ", IK" } else { "" }
        );

        match self.config.angles {
            AngleRepresentation::Euler => self.run::<DVec3>(input, schedule, ik),
            AngleRepresentation::Quaternion => self.run::<Quaternion>(input, schedule, ik),
        }
    }

    fn run<T: AngleSpace>(
        &self,
        input: &Motion,
        schedule: &KeyframeSchedule,
        ik: Option<&IkCorrection>,
    ) -> Result<Motion> {
        let keys: Vec<KeyPose<T>> = schedule
            .frames()
            .iter()
            .map(|&frame| {
                input
                    .posture(frame)
                    .map(KeyPose::from_posture)
                    .ok_or(KinematicsError::FrameOutOfRange {
                        frame,
                        frame_count: input.frame_count(),
                    })
            })
            .collect::<Result<_>>()?;

        let curves = (0..keys.len().saturating_sub(1))
            .map(|segment| {
                let curve = match self.config.interpolation {
                    InterpolationType::Linear => {
                        LinearSegment::new(&keys, segment).map(SegmentCurve::Linear)
                    }
                    InterpolationType::Bezier => {
                        BezierSegment::new(&keys, segment).map(SegmentCurve::Bezier)
                    }
                };
                curve.ok_or_else(|| {
                    KinematicsError::InvalidConfiguration(format!(
                        "missing keyframe segment {segment}"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let jobs: Vec<FrameJob> = schedule
            .segments()
            .enumerate()
            .flat_map(|(segment, (start, end))| {
                let span = (end - start) as f64;
                (start + 1..end).map(move |frame| FrameJob {
                    frame,
                    segment,
                    t: (frame - start) as f64 / span,
                })
            })
            .collect();

        for (segment, (start, end)) in schedule.segments().enumerate() {
            log::debug!("Segment {segment}: frames {start}..{end}");
        }

        let generate = |job: &FrameJob| -> Result<(usize, Posture)> {
            let mut posture = curves[job.segment].evaluate(job.t).to_posture();
            if let Some(ik) = ik {
                let original = input.posture(job.frame).ok_or(KinematicsError::FrameOutOfRange {
                    frame: job.frame,
                    frame_count: input.frame_count(),
                })?;
                ik.correct(&mut posture, original)?;
            }
            Ok((job.frame, posture))
        };

        #[cfg(feature = "parallel")]
        let generated: Result<Vec<(usize, Posture)>> = {
            use rayon::prelude::*;
            jobs.par_iter().map(generate).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let generated: Result<Vec<(usize, Posture)>> = jobs.iter().map(generate).collect();

        let mut output = input.clone();
        for (frame, posture) in generated? {
            output.set_posture(frame, posture)?;
        }

        log::info!("Generated {} in-between frames", jobs.len());

        Ok(output)
    }
}
