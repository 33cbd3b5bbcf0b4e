//! Acclaim Motion Capture (AMC) reader and writer
//!
//! AMC files hold one block per frame: a frame number line followed by one
//! line per bone with the values of the channels its ASF declared.

use crate::asf::{AsfSkeleton, Channel, parse_f64};
use crate::error::{AsfAmcError, Result};
use glam::DVec3;
use mocap_kinematics::{KinematicsError, Motion, Posture, Skeleton};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Options for [`write_amc`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AmcWriteOptions {
    /// Write `rx ry rz` for every non-root bone instead of its declared
    /// channels
    pub force_all_three_dofs: bool,
}

/// Parse AMC text against the skeleton it was recorded for
///
/// Root translations are multiplied by the skeleton's scale. Bones missing
/// from a frame keep zero rotations.
pub fn parse_amc(content: &str, asf: &AsfSkeleton) -> Result<Motion> {
    let bone_count = asf.bone_count();
    let names: HashMap<&str, usize> = asf
        .skeleton
        .bones()
        .iter()
        .filter_map(|bone| Some((bone.name()?, bone.index())))
        .collect();

    let mut radians = false;
    let mut frames: Vec<Posture> = Vec::new();
    let mut first_frame = None;

    for (index, raw) in content.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(keyword) = line.strip_prefix(':') {
            match keyword.trim().to_ascii_uppercase().as_str() {
                "FULLY-SPECIFIED" => {}
                "DEGREES" => radians = false,
                "RADIANS" => radians = true,
                other => log::debug!("Ignoring AMC keyword ':{}' at line {}", other, number),
            }
            continue;
        }

        let mut tokens = line.split_whitespace();
        let head = tokens.next().unwrap_or_default();

        if let Ok(frame_number) = head.parse::<usize>() {
            if tokens.next().is_some() {
                return Err(AsfAmcError::parse(number, "unexpected values after frame number"));
            }
            let first = *first_frame.get_or_insert(frame_number);
            let expected = first + frames.len();
            if frame_number != expected {
                return Err(AsfAmcError::parse(
                    number,
                    format!("expected frame {expected}, found {frame_number}"),
                ));
            }
            frames.push(Posture::rest(bone_count));
            continue;
        }

        let Some(posture) = frames.last_mut() else {
            return Err(AsfAmcError::parse(number, "bone values before the first frame"));
        };
        let &bone = names
            .get(head)
            .ok_or_else(|| AsfAmcError::UnknownBone(head.to_string()))?;
        let values = tokens
            .map(|token| parse_f64(number, token))
            .collect::<Result<Vec<_>>>()?;

        apply_bone_values(posture, asf, bone, &values, radians)
            .map_err(|message| AsfAmcError::parse(number, message))?;
    }

    log::debug!(
        "Parsed {} AMC frames starting at frame {}",
        frames.len(),
        first_frame.unwrap_or(1)
    );

    Ok(Motion::from_frames(bone_count, frames)?)
}

/// Read and parse an AMC file
pub fn load_amc<P: AsRef<Path>>(path: P, asf: &AsfSkeleton) -> Result<Motion> {
    let content = fs::read_to_string(path)?;
    parse_amc(&content, asf)
}

fn apply_bone_values(
    posture: &mut Posture,
    asf: &AsfSkeleton,
    bone: usize,
    values: &[f64],
    radians: bool,
) -> std::result::Result<(), String> {
    const ROTATIONS: [Channel; 3] = [Channel::Rx, Channel::Ry, Channel::Rz];

    let declared = asf.channels(bone);
    // Files written with every joint forced to three DOFs list rx ry rz
    let channels = if values.len() == declared.len() {
        declared
    } else if bone != Skeleton::ROOT && values.len() == 3 {
        &ROTATIONS[..]
    } else {
        return Err(format!(
            "expected {} values for bone {}, found {}",
            declared.len(),
            bone,
            values.len()
        ));
    };

    for (&channel, &value) in channels.iter().zip(values) {
        if let Some(axis) = channel.rotation_axis() {
            let degrees = if radians { value.to_degrees() } else { value };
            posture.bone_rotations[bone][axis.index()] = degrees;
        } else if let Some(axis) = channel.translation_axis() {
            if bone == Skeleton::ROOT {
                posture.root_position[axis.index()] = value * asf.scale;
            }
        }
    }
    Ok(())
}

/// Write a motion as AMC text
///
/// Angles are written in degrees. Root translations are divided by the
/// skeleton's scale. Translation and length channels of non-root bones are
/// not stored in a [`Posture`] and are written as zero.
pub fn write_amc<W: Write>(
    writer: &mut W,
    motion: &Motion,
    asf: &AsfSkeleton,
    options: &AmcWriteOptions,
) -> Result<()> {
    if motion.bone_count() != asf.bone_count() {
        return Err(KinematicsError::BoneCountMismatch {
            expected: asf.bone_count(),
            found: motion.bone_count(),
        }
        .into());
    }

    writeln!(writer, "# Written by asf-amc {}", crate::VERSION)?;
    writeln!(writer, ":FULLY-SPECIFIED")?;
    writeln!(writer, ":DEGREES")?;

    let names: Vec<&str> = asf
        .skeleton
        .bones()
        .iter()
        .map(|bone| bone.name().unwrap_or("root"))
        .collect();

    for (index, posture) in motion.iter().enumerate() {
        writeln!(writer, "{}", index + 1)?;
        for (bone, name) in names.iter().enumerate() {
            let channels = asf.channels(bone);
            let values: Vec<f64> = if bone != Skeleton::ROOT && options.force_all_three_dofs {
                posture.bone_rotations[bone].to_array().to_vec()
            } else if channels.is_empty() {
                continue;
            } else {
                channels
                    .iter()
                    .map(|&channel| channel_value(posture, asf.scale, bone, channel))
                    .collect()
            };

            let values = values
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{name} {values}")?;
        }
    }

    log::debug!("Wrote {} AMC frames", motion.frame_count());
    Ok(())
}

fn channel_value(posture: &Posture, scale: f64, bone: usize, channel: Channel) -> f64 {
    let rotation: DVec3 = posture.bone_rotations[bone];
    if let Some(axis) = channel.rotation_axis() {
        rotation[axis.index()]
    } else if let Some(axis) = channel.translation_axis()
        && bone == Skeleton::ROOT
    {
        posture.root_position[axis.index()] / scale
    } else {
        0.0
    }
}

/// Write a motion to an AMC file
pub fn save_amc<P: AsRef<Path>>(
    path: P,
    motion: &Motion,
    asf: &AsfSkeleton,
    options: &AmcWriteOptions,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_amc(&mut writer, motion, asf, options)?;
    writer.flush()?;
    Ok(())
}
