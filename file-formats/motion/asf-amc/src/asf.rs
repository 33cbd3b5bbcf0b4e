//! Acclaim Skeleton File (ASF) reader
//!
//! An ASF file declares the bone hierarchy, rest geometry and the channel
//! layout that AMC frames follow. Bones are indexed in `:bonedata` order
//! starting at 1, with the root at index 0.

use crate::error::{AsfAmcError, Result};
use glam::DVec3;
use mocap_kinematics::skeleton::{BoneSpec, RotationalDofs, Skeleton, SkeletonBuilder};
use mocap_kinematics::{Axis, KinematicsError};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default scale applied to bone lengths and root translations
pub const MOCAP_SCALE: f64 = 0.06;

/// One value per frame in an AMC bone line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Tx,
    Ty,
    Tz,
    Rx,
    Ry,
    Rz,
    /// Bone length change
    Length,
}

impl Channel {
    /// Parse an ASF channel token (`rx`, `TX`, `l`, ...)
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "tx" => Some(Self::Tx),
            "ty" => Some(Self::Ty),
            "tz" => Some(Self::Tz),
            "rx" => Some(Self::Rx),
            "ry" => Some(Self::Ry),
            "rz" => Some(Self::Rz),
            "l" => Some(Self::Length),
            _ => None,
        }
    }

    /// Axis of a rotational channel
    pub fn rotation_axis(self) -> Option<Axis> {
        match self {
            Self::Rx => Some(Axis::X),
            Self::Ry => Some(Axis::Y),
            Self::Rz => Some(Axis::Z),
            _ => None,
        }
    }

    /// Axis of a translational channel
    pub fn translation_axis(self) -> Option<Axis> {
        match self {
            Self::Tx => Some(Axis::X),
            Self::Ty => Some(Axis::Y),
            Self::Tz => Some(Axis::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Tx => "tx",
            Self::Ty => "ty",
            Self::Tz => "tz",
            Self::Rx => "rx",
            Self::Ry => "ry",
            Self::Rz => "rz",
            Self::Length => "l",
        };
        f.write_str(token)
    }
}

/// Rotational DOFs enabled by a channel list
pub fn rotational_dofs(channels: &[Channel]) -> RotationalDofs {
    let has = |axis| channels.iter().any(|c| c.rotation_axis() == Some(axis));
    RotationalDofs::new(has(Axis::X), has(Axis::Y), has(Axis::Z))
}

/// Angle unit declared in `:units`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Convert a value in this unit to degrees
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            Self::Degrees => value,
            Self::Radians => value.to_degrees(),
        }
    }
}

/// The `:units` section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsfUnits {
    pub mass: f64,
    pub length: f64,
    pub angle: AngleUnit,
}

impl Default for AsfUnits {
    fn default() -> Self {
        Self {
            mass: 1.0,
            length: 1.0,
            angle: AngleUnit::Degrees,
        }
    }
}

/// A parsed ASF file
#[derive(Debug, Clone)]
pub struct AsfSkeleton {
    pub version: Option<String>,
    pub name: Option<String>,
    pub units: AsfUnits,
    /// Scale applied to bone lengths here and to root translations in AMC
    pub scale: f64,
    /// Rest root position from `:root`, unscaled
    pub root_position: DVec3,
    pub skeleton: Skeleton,
    /// AMC channel order per bone; index 0 is the root
    pub channels: Vec<Vec<Channel>>,
    /// Declared `(min, max)` limits per bone, degrees for rotations
    pub limits: Vec<Vec<(f64, f64)>>,
}

impl AsfSkeleton {
    /// Parse ASF text, scaling bone lengths by `scale`
    pub fn parse(content: &str, scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(KinematicsError::InvalidConfiguration(format!(
                "scale must be positive, got {scale}"
            ))
            .into());
        }

        let mut parser = AsfParser::new(scale);
        for (index, line) in content.lines().enumerate() {
            parser.parse_line(index + 1, line)?;
        }
        parser.finish()
    }

    /// Read and parse an ASF file
    pub fn load<P: AsRef<Path>>(path: P, scale: f64) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, scale)
    }

    /// Number of bones, including the root
    pub fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }

    /// Find a bone index by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.skeleton.bone_index(name)
    }

    /// Channels of a bone, empty for unknown indices
    pub fn channels(&self, bone: usize) -> &[Channel] {
        self.channels.get(bone).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Units,
    Documentation,
    Root,
    BoneData,
    Hierarchy,
    Unknown,
}

#[derive(Debug, Default)]
struct BoneRecord {
    line: usize,
    name: Option<String>,
    direction: Option<DVec3>,
    length: Option<f64>,
    axis: DVec3,
    channels: Vec<Channel>,
    limits: Vec<(f64, f64)>,
}

#[derive(Debug)]
struct HierarchyLine {
    line: usize,
    parent: String,
    children: Vec<String>,
}

#[derive(Debug)]
struct AsfParser {
    scale: f64,
    section: Section,
    version: Option<String>,
    name: Option<String>,
    units: AsfUnits,
    root_order: Option<Vec<Channel>>,
    root_position: DVec3,
    root_orientation: DVec3,
    bones: Vec<BoneRecord>,
    current: Option<BoneRecord>,
    in_limits: bool,
    hierarchy: Vec<HierarchyLine>,
}

impl AsfParser {
    fn new(scale: f64) -> Self {
        Self {
            scale,
            section: Section::Preamble,
            version: None,
            name: None,
            units: AsfUnits::default(),
            root_order: None,
            root_position: DVec3::ZERO,
            root_orientation: DVec3::ZERO,
            bones: Vec::new(),
            current: None,
            in_limits: false,
            hierarchy: Vec::new(),
        }
    }

    fn parse_line(&mut self, number: usize, raw: &str) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if let Some(header) = line.strip_prefix(':') {
            return self.start_section(number, header);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match self.section {
            Section::Preamble => Err(AsfAmcError::parse(
                number,
                "unexpected content before the first section",
            )),
            Section::Documentation | Section::Unknown => Ok(()),
            Section::Units => self.parse_units(number, &tokens),
            Section::Root => self.parse_root(number, &tokens),
            Section::BoneData => self.parse_bone_data(number, line, &tokens),
            Section::Hierarchy => self.parse_hierarchy(number, &tokens),
        }
    }

    fn start_section(&mut self, number: usize, header: &str) -> Result<()> {
        if let Some(bone) = &self.current {
            return Err(AsfAmcError::parse(
                bone.line,
                "bone block is missing its 'end'",
            ));
        }

        let mut tokens = header.split_whitespace();
        let keyword = tokens.next().unwrap_or_default().to_ascii_lowercase();
        let rest = tokens.collect::<Vec<_>>().join(" ");

        self.section = match keyword.as_str() {
            "version" => {
                self.version = Some(rest);
                Section::Preamble
            }
            "name" => {
                self.name = Some(rest);
                Section::Preamble
            }
            "units" => Section::Units,
            "documentation" => Section::Documentation,
            "root" => Section::Root,
            "bonedata" => Section::BoneData,
            "hierarchy" => Section::Hierarchy,
            _ => {
                log::warn!("Skipping unknown ASF section ':{}' at line {}", keyword, number);
                Section::Unknown
            }
        };
        Ok(())
    }

    fn parse_units(&mut self, number: usize, tokens: &[&str]) -> Result<()> {
        let [key, value] = tokens else {
            return Err(AsfAmcError::parse(number, "expected '<unit> <value>'"));
        };
        match key.to_ascii_lowercase().as_str() {
            "mass" => self.units.mass = parse_f64(number, value)?,
            "length" => self.units.length = parse_f64(number, value)?,
            "angle" => {
                self.units.angle = match value.to_ascii_lowercase().as_str() {
                    "deg" | "degree" | "degrees" => AngleUnit::Degrees,
                    "rad" | "radian" | "radians" => AngleUnit::Radians,
                    other => {
                        return Err(AsfAmcError::parse(
                            number,
                            format!("unknown angle unit '{other}'"),
                        ));
                    }
                }
            }
            other => log::debug!("Ignoring unit '{}' at line {}", other, number),
        }
        Ok(())
    }

    fn parse_root(&mut self, number: usize, tokens: &[&str]) -> Result<()> {
        match tokens[0].to_ascii_lowercase().as_str() {
            "order" => {
                let channels = parse_channels(number, &tokens[1..])?;
                self.root_order = Some(channels);
            }
            "axis" => check_axis_order(number, tokens.get(1).copied())?,
            "position" => self.root_position = parse_vec3(number, "position", &tokens[1..])?,
            "orientation" => {
                self.root_orientation = parse_vec3(number, "orientation", &tokens[1..])?;
            }
            other => {
                return Err(AsfAmcError::parse(
                    number,
                    format!("unknown root field '{other}'"),
                ));
            }
        }
        Ok(())
    }

    fn parse_bone_data(&mut self, number: usize, line: &str, tokens: &[&str]) -> Result<()> {
        let keyword = tokens[0].to_ascii_lowercase();

        if keyword == "begin" {
            if self.current.is_some() {
                return Err(AsfAmcError::parse(number, "nested 'begin' in bone block"));
            }
            self.current = Some(BoneRecord {
                line: number,
                ..BoneRecord::default()
            });
            self.in_limits = false;
            return Ok(());
        }

        let Some(bone) = self.current.as_mut() else {
            return Err(AsfAmcError::parse(
                number,
                format!("'{keyword}' outside a bone block"),
            ));
        };

        // Limits continue on following lines, one "(min max)" pair each
        if self.in_limits && line.starts_with('(') {
            bone.limits.extend(parse_limits(number, line)?);
            return Ok(());
        }
        self.in_limits = false;

        match keyword.as_str() {
            "end" => {
                let bone = self.current.take().unwrap_or_default();
                self.bones.push(bone);
            }
            "id" => {}
            "name" => {
                let [_, name] = tokens else {
                    return Err(AsfAmcError::parse(number, "expected 'name <bone>'"));
                };
                bone.name = Some((*name).to_string());
            }
            "direction" => bone.direction = Some(parse_vec3(number, "direction", &tokens[1..])?),
            "length" => {
                let [_, value] = tokens else {
                    return Err(AsfAmcError::parse(number, "expected 'length <value>'"));
                };
                bone.length = Some(parse_f64(number, value)?);
            }
            "axis" => {
                if tokens.len() < 4 {
                    return Err(AsfAmcError::parse(number, "expected 3 values for 'axis'"));
                }
                bone.axis = parse_vec3(number, "axis", &tokens[1..4])?;
                check_axis_order(number, tokens.get(4).copied())?;
            }
            "dof" => bone.channels = parse_channels(number, &tokens[1..])?,
            "limits" => {
                let rest = line[tokens[0].len()..].trim();
                if !rest.is_empty() {
                    bone.limits.extend(parse_limits(number, rest)?);
                }
                self.in_limits = true;
            }
            other => {
                log::debug!("Ignoring bone field '{}' at line {}", other, number);
            }
        }
        Ok(())
    }

    fn parse_hierarchy(&mut self, number: usize, tokens: &[&str]) -> Result<()> {
        match tokens {
            [keyword] if keyword.eq_ignore_ascii_case("begin") => {}
            [keyword] if keyword.eq_ignore_ascii_case("end") => {}
            [parent, children @ ..] => self.hierarchy.push(HierarchyLine {
                line: number,
                parent: (*parent).to_string(),
                children: children.iter().map(|c| (*c).to_string()).collect(),
            }),
            [] => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<AsfSkeleton> {
        if let Some(bone) = &self.current {
            return Err(AsfAmcError::parse(
                bone.line,
                "bone block is missing its 'end'",
            ));
        }

        let angle = self.units.angle;
        let to_degrees = |v: DVec3| v.map(|c| angle.to_degrees(c));
        let root_order = self.root_order.unwrap_or_else(|| {
            vec![
                Channel::Tx,
                Channel::Ty,
                Channel::Tz,
                Channel::Rx,
                Channel::Ry,
                Channel::Rz,
            ]
        });

        let mut builder =
            SkeletonBuilder::new(to_degrees(self.root_orientation), rotational_dofs(&root_order));
        let mut channels = vec![root_order];
        let mut limits = vec![Vec::new()];
        let mut seen = HashSet::new();

        for bone in self.bones {
            let name = bone
                .name
                .ok_or_else(|| AsfAmcError::parse(bone.line, "bone has no name"))?;
            if !seen.insert(name.clone()) || name == "root" {
                return Err(AsfAmcError::parse(
                    bone.line,
                    format!("duplicate bone name '{name}'"),
                ));
            }
            let direction = bone.direction.ok_or_else(|| {
                AsfAmcError::parse(bone.line, format!("bone '{name}' has no direction"))
            })?;
            let length = bone.length.ok_or_else(|| {
                AsfAmcError::parse(bone.line, format!("bone '{name}' has no length"))
            })?;
            if !bone.limits.is_empty() && bone.limits.len() != bone.channels.len() {
                return Err(AsfAmcError::parse(
                    bone.line,
                    format!(
                        "bone '{name}' declares {} limits for {} channels",
                        bone.limits.len(),
                        bone.channels.len()
                    ),
                ));
            }

            let bone_limits = bone
                .channels
                .iter()
                .zip(&bone.limits)
                .map(|(channel, &(min, max))| match channel.rotation_axis() {
                    Some(_) => (angle.to_degrees(min), angle.to_degrees(max)),
                    None => (min, max),
                })
                .collect();

            builder.add_bone(
                BoneSpec::new(name, direction, length * self.scale)
                    .with_axis(to_degrees(bone.axis))
                    .with_dofs(rotational_dofs(&bone.channels)),
            );
            channels.push(bone.channels);
            limits.push(bone_limits);
        }

        for entry in &self.hierarchy {
            let parent = builder
                .bone_index(&entry.parent)
                .ok_or_else(|| AsfAmcError::UnknownBone(entry.parent.clone()))?;
            for child in &entry.children {
                let child = builder
                    .bone_index(child)
                    .ok_or_else(|| AsfAmcError::UnknownBone(child.clone()))?;
                builder.attach(parent, child).map_err(|e| match e {
                    KinematicsError::InvalidSkeleton(message) => {
                        AsfAmcError::parse(entry.line, message)
                    }
                    other => other.into(),
                })?;
            }
        }

        let skeleton = builder.build()?;
        log::debug!(
            "Parsed ASF skeleton {:?} with {} bones",
            self.name.as_deref().unwrap_or("<unnamed>"),
            skeleton.bone_count()
        );

        Ok(AsfSkeleton {
            version: self.version,
            name: self.name,
            units: self.units,
            scale: self.scale,
            root_position: self.root_position,
            skeleton,
            channels,
            limits,
        })
    }
}

pub(crate) fn parse_f64(line: usize, token: &str) -> Result<f64> {
    token
        .parse()
        .map_err(|_| AsfAmcError::parse(line, format!("invalid number '{token}'")))
}

fn parse_vec3(line: usize, field: &str, tokens: &[&str]) -> Result<DVec3> {
    let [x, y, z] = tokens else {
        return Err(AsfAmcError::parse(
            line,
            format!("expected 3 values for '{field}'"),
        ));
    };
    Ok(DVec3::new(
        parse_f64(line, x)?,
        parse_f64(line, y)?,
        parse_f64(line, z)?,
    ))
}

fn parse_channels(line: usize, tokens: &[&str]) -> Result<Vec<Channel>> {
    let mut channels = Vec::with_capacity(tokens.len());
    for token in tokens {
        let channel = Channel::from_token(token)
            .ok_or_else(|| AsfAmcError::parse(line, format!("unknown channel '{token}'")))?;
        if channels.contains(&channel) {
            return Err(AsfAmcError::parse(
                line,
                format!("channel '{channel}' listed twice"),
            ));
        }
        channels.push(channel);
    }
    Ok(channels)
}

fn parse_limits(line: usize, text: &str) -> Result<Vec<(f64, f64)>> {
    let cleaned = text.replace(['(', ')'], " ");
    let values = cleaned
        .split_whitespace()
        .map(|token| parse_f64(line, token))
        .collect::<Result<Vec<_>>>()?;
    if values.len() % 2 != 0 {
        return Err(AsfAmcError::parse(line, "limits must come in (min max) pairs"));
    }
    Ok(values.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

/// Only XYZ axis order is supported
fn check_axis_order(line: usize, order: Option<&str>) -> Result<()> {
    match order {
        None => Ok(()),
        Some(order) if order.eq_ignore_ascii_case("xyz") => Ok(()),
        Some(order) => Err(AsfAmcError::parse(
            line,
            format!("unsupported axis order '{order}'"),
        )),
    }
}
