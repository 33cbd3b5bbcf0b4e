//! Reader and writer for Acclaim ASF/AMC motion capture files.
//!
//! - [`asf`]: skeleton files, parsed into a
//!   [`Skeleton`](mocap_kinematics::Skeleton) plus per-bone channel layout
//! - [`amc`]: motion files, read into and written from a
//!   [`Motion`](mocap_kinematics::Motion)
//! - [`keyframes`]: keyframe index lists
//!
//! # Examples
//!
//! ```no_run
//! use asf_amc::{AsfSkeleton, MOCAP_SCALE, load_amc};
//!
//! let asf = AsfSkeleton::load("subject.asf", MOCAP_SCALE)?;
//! let motion = load_amc("walk.amc", &asf)?;
//! println!("{} frames of {} bones", motion.frame_count(), asf.bone_count());
//! # Ok::<(), asf_amc::AsfAmcError>(())
//! ```

#![forbid(unsafe_code)]

pub mod amc;
pub mod asf;
pub mod error;
pub mod keyframes;

pub use amc::{AmcWriteOptions, load_amc, parse_amc, save_amc, write_amc};
pub use asf::{AngleUnit, AsfSkeleton, AsfUnits, Channel, MOCAP_SCALE};
pub use error::{AsfAmcError, Result};
pub use keyframes::{load_keyframe_list, parse_keyframe_list};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
