//! Integration tests for mocap-kinematics
//!
//! Exercises the public API on a full 31-bone humanoid skeleton laid out
//! like the CMU motion capture database.

mod integration;
