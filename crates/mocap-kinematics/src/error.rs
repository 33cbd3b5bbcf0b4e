//! Error types for kinematics and interpolation

use thiserror::Error;

/// Errors that can occur while building skeletons, evaluating kinematics,
/// or interpolating motions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Invalid interpolation configuration (unknown type, bad schedule, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Bezier interpolation needs more keyframes than the schedule provides
    #[error("Insufficient keyframes: need at least {required}, found {found}")]
    InsufficientKeyframes { required: usize, found: usize },

    /// Posture or motion does not match the skeleton it is evaluated against
    #[error("Bone count mismatch: expected {expected}, found {found}")]
    BoneCountMismatch { expected: usize, found: usize },

    /// Bone index outside the skeleton
    #[error("Unknown bone index: {0}")]
    UnknownBone(usize),

    /// Start bone is not an ancestor of the end bone
    #[error("Invalid bone chain: bone {start} is not an ancestor of bone {end}")]
    InvalidChain { start: usize, end: usize },

    /// Skeleton hierarchy failed validation
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// Frame index outside the motion
    #[error("Frame {frame} out of range (motion has {frame_count} frames)")]
    FrameOutOfRange { frame: usize, frame_count: usize },
}

/// Result type using KinematicsError
pub type Result<T> = std::result::Result<T, KinematicsError>;
