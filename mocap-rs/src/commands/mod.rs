//! Command implementations

pub mod ik;
pub mod interpolate;
pub mod skeleton;
