//! Error types for ASF/AMC parsing and writing

use mocap_kinematics::KinematicsError;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing ASF and AMC files
#[derive(Error, Debug)]
pub enum AsfAmcError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed content at the given 1-based line
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Bone name not declared by the skeleton
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    /// The parsed data does not form a valid skeleton or motion
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

impl AsfAmcError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type using AsfAmcError
pub type Result<T> = std::result::Result<T, AsfAmcError>;
