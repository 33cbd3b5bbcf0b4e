//! Shared utilities for the mocap-rs CLI

pub mod format;
pub mod tree;

pub use format::*;
pub use tree::*;
