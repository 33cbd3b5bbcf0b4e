//! Shared test skeletons and motions

use glam::DVec3;
use mocap_kinematics::{BoneSpec, Motion, Posture, RotationalDofs, Skeleton, SkeletonBuilder};

const NONE: RotationalDofs = RotationalDofs::NONE;
const ALL: RotationalDofs = RotationalDofs::ALL;
const X: RotationalDofs = RotationalDofs::new(true, false, false);
const Y: RotationalDofs = RotationalDofs::new(false, true, false);
const XZ: RotationalDofs = RotationalDofs::new(true, false, true);
const YZ: RotationalDofs = RotationalDofs::new(false, true, true);

/// Bone name, parent name, global direction, length, DOFs
type BoneRow = (&'static str, &'static str, [f64; 3], f64, RotationalDofs);

/// CMU bone order, so bone indices match the standard layout
const HUMANOID: &[BoneRow] = &[
    ("lhipjoint", "root", [0.6, -0.8, 0.0], 0.15, NONE),
    ("lfemur", "lhipjoint", [0.34, -0.94, 0.0], 0.43, ALL),
    ("ltibia", "lfemur", [0.34, -0.94, 0.0], 0.44, X),
    ("lfoot", "ltibia", [0.0, -0.2, 0.98], 0.13, XZ),
    ("ltoes", "lfoot", [0.0, 0.0, 1.0], 0.07, X),
    ("rhipjoint", "root", [-0.6, -0.8, 0.0], 0.15, NONE),
    ("rfemur", "rhipjoint", [-0.34, -0.94, 0.0], 0.43, ALL),
    ("rtibia", "rfemur", [-0.34, -0.94, 0.0], 0.44, X),
    ("rfoot", "rtibia", [0.0, -0.2, 0.98], 0.13, XZ),
    ("rtoes", "rfoot", [0.0, 0.0, 1.0], 0.07, X),
    ("lowerback", "root", [0.0, 1.0, 0.0], 0.12, ALL),
    ("upperback", "lowerback", [0.0, 1.0, 0.0], 0.12, ALL),
    ("thorax", "upperback", [0.0, 1.0, 0.0], 0.12, ALL),
    ("lowerneck", "thorax", [0.0, 1.0, 0.0], 0.1, ALL),
    ("upperneck", "lowerneck", [0.0, 1.0, 0.0], 0.1, ALL),
    ("head", "upperneck", [0.0, 1.0, 0.0], 0.1, ALL),
    ("lclavicle", "thorax", [1.0, 0.2, 0.0], 0.2, YZ),
    ("lhumerus", "lclavicle", [1.0, 0.0, 0.0], 0.3, ALL),
    ("lradius", "lhumerus", [1.0, 0.0, 0.0], 0.2, X),
    ("lwrist", "lradius", [1.0, 0.0, 0.0], 0.1, Y),
    ("lhand", "lwrist", [1.0, 0.0, 0.0], 0.05, XZ),
    ("lfingers", "lhand", [1.0, 0.0, 0.0], 0.04, X),
    ("lthumb", "lhand", [1.0, 0.0, 1.0], 0.03, XZ),
    ("rclavicle", "thorax", [-1.0, 0.2, 0.0], 0.2, YZ),
    ("rhumerus", "rclavicle", [-1.0, 0.0, 0.0], 0.3, ALL),
    ("rradius", "rhumerus", [-1.0, 0.0, 0.0], 0.2, X),
    ("rwrist", "rradius", [-1.0, 0.0, 0.0], 0.1, Y),
    ("rhand", "rwrist", [-1.0, 0.0, 0.0], 0.05, XZ),
    ("rfingers", "rhand", [-1.0, 0.0, 0.0], 0.04, X),
    ("rthumb", "rhand", [-1.0, 0.0, 1.0], 0.03, XZ),
];

pub const BONE_COUNT: usize = 31;

pub fn humanoid() -> Skeleton {
    let mut builder = SkeletonBuilder::new(DVec3::ZERO, ALL);
    for &(name, _, direction, length, dofs) in HUMANOID {
        builder.add_bone(BoneSpec::new(name, DVec3::from_array(direction), length).with_dofs(dofs));
    }
    for &(name, parent, ..) in HUMANOID {
        let parent = builder.bone_index(parent).unwrap();
        let child = builder.bone_index(name).unwrap();
        builder.attach(parent, child).unwrap();
    }
    builder.build().unwrap()
}

/// A posture with bent knees and raised arms, rotating only enabled axes
pub fn posed(amount: f64) -> Posture {
    let mut posture = Posture::rest(BONE_COUNT);
    posture.root_position = DVec3::new(0.1 * amount, 0.9, 0.3 * amount);
    let rotations = &mut posture.bone_rotations;
    rotations[2] = DVec3::new(20.0, 5.0, -10.0) * amount;
    rotations[3] = DVec3::new(40.0, 0.0, 0.0) * amount;
    rotations[4] = DVec3::new(-10.0, 0.0, 5.0) * amount;
    rotations[7] = DVec3::new(-15.0, 0.0, 5.0) * amount;
    rotations[8] = DVec3::new(25.0, 0.0, 0.0) * amount;
    rotations[18] = DVec3::new(10.0, -20.0, 30.0) * amount;
    rotations[19] = DVec3::new(30.0, 0.0, 0.0) * amount;
    rotations[20] = DVec3::new(0.0, 15.0, 0.0) * amount;
    rotations[25] = DVec3::new(-5.0, 10.0, -30.0) * amount;
    rotations[26] = DVec3::new(20.0, 0.0, 0.0) * amount;
    posture
}

/// A walking-like cycle: `posed` scaled by a sine over `frame_count` frames
pub fn swinging_motion(frame_count: usize) -> Motion {
    let frames = (0..frame_count)
        .map(|frame| {
            let phase = frame as f64 / frame_count as f64 * std::f64::consts::TAU;
            posed(phase.sin())
        })
        .collect();
    Motion::from_frames(BONE_COUNT, frames).unwrap()
}
