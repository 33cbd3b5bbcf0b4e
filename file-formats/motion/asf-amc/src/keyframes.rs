//! Keyframe list files
//!
//! A keyframe list is whitespace-separated frame indices, ascending, with
//! `#` starting a comment that runs to the end of the line.

use crate::error::{AsfAmcError, Result};
use mocap_kinematics::KeyframeSchedule;
use std::fs;
use std::path::Path;

/// Parse a keyframe list
pub fn parse_keyframe_list(content: &str) -> Result<KeyframeSchedule> {
    let mut frames = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(data, _)| data);
        for token in line.split_whitespace() {
            let frame = token.parse::<usize>().map_err(|_| {
                AsfAmcError::parse(index + 1, format!("invalid frame index '{token}'"))
            })?;
            frames.push(frame);
        }
    }

    Ok(KeyframeSchedule::from_frames(frames)?)
}

/// Read and parse a keyframe list file
pub fn load_keyframe_list<P: AsRef<Path>>(path: P) -> Result<KeyframeSchedule> {
    let content = fs::read_to_string(path)?;
    parse_keyframe_list(&content)
}
