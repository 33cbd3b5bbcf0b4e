//! Formatting utilities

use asf_amc::Channel;
use glam::DVec3;
use mocap_kinematics::RotationalDofs;

/// Format a vector with fixed precision
pub fn format_vec3(v: DVec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

/// Format enabled rotational DOFs as `rx ry rz`, or `-` when locked
pub fn format_dofs(dofs: RotationalDofs) -> String {
    let axes: Vec<String> = dofs
        .axes()
        .map(|axis| format!("r{axis}"))
        .collect();
    if axes.is_empty() {
        "-".to_string()
    } else {
        axes.join(" ")
    }
}

/// Format an AMC channel list
pub fn format_channels(channels: &[Channel]) -> String {
    channels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
