//! Reading, writing and interpolating the CMU-layout test subject

use asf_amc::{
    AmcWriteOptions, AsfSkeleton, MOCAP_SCALE, load_amc, load_keyframe_list, parse_amc, save_amc,
    write_amc,
};
use glam::DVec3;
use mocap_kinematics::{
    AngleRepresentation, IkCorrection, InterpolationType, Interpolator, InterpolatorConfig,
    KeyframeSchedule, LimbChain, Motion,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn subject() -> AsfSkeleton {
    AsfSkeleton::load(data_path("humanoid.asf"), MOCAP_SCALE).unwrap()
}

fn walk(asf: &AsfSkeleton) -> Motion {
    load_amc(data_path("walk.amc"), asf).unwrap()
}

fn assert_motions_close(a: &Motion, b: &Motion) {
    assert_eq!(a.frame_count(), b.frame_count());
    for (frame, (pa, pb)) in a.iter().zip(b.iter()).enumerate() {
        assert!(
            (pa.root_position - pb.root_position).length() < 1e-9,
            "root differs at frame {frame}"
        );
        assert_eq!(pa.bone_rotations, pb.bone_rotations, "frame {frame}");
    }
}

#[test]
fn test_subject_layout() {
    let asf = subject();
    assert_eq!(asf.bone_count(), 31);
    assert_eq!(asf.name.as_deref(), Some("VICON"));
    assert_eq!(
        LimbChain::resolve(&asf.skeleton).unwrap(),
        LimbChain::CMU_DEFAULT.to_vec()
    );

    let femur = asf.skeleton.bone(asf.bone_index("lfemur").unwrap()).unwrap();
    assert!((femur.length() - 0.43).abs() < 1e-6);

    let thorax = asf.bone_index("thorax").unwrap();
    let children: Vec<_> = asf
        .skeleton
        .children(thorax)
        .filter_map(|child| asf.skeleton.bone(child).ok()?.name())
        .collect();
    assert_eq!(children, vec!["lowerneck", "lclavicle", "rclavicle"]);
}

#[test]
fn test_walk_frames() {
    let asf = subject();
    let motion = walk(&asf);
    assert_eq!(motion.frame_count(), 25);

    let first = motion.posture(0).unwrap();
    assert!((first.root_position - DVec3::new(0.0, 0.9, 0.0)).length() < 1e-12);
    assert!(first.bone_rotations.iter().all(|r| *r == DVec3::ZERO));

    let humerus = asf.bone_index("lhumerus").unwrap();
    assert_eq!(
        motion.posture(1).unwrap().bone_rotations[humerus],
        DVec3::new(2.487, -4.974, 7.461)
    );
}

#[test]
fn test_save_and_reload() {
    let asf = subject();
    let motion = walk(&asf);
    let dir = TempDir::new().unwrap();

    for force_all_three_dofs in [false, true] {
        let path = dir.path().join(format!("walk_{force_all_three_dofs}.amc"));
        save_amc(&path, &motion, &asf, &AmcWriteOptions { force_all_three_dofs }).unwrap();
        let reloaded = load_amc(&path, &asf).unwrap();
        assert_motions_close(&reloaded, &motion);
    }
}

#[test]
fn test_interpolate_and_write() {
    let asf = subject();
    let motion = walk(&asf);
    let schedule = KeyframeSchedule::uniform(6, motion.frame_count()).unwrap();

    let interpolator = Interpolator::new(InterpolatorConfig {
        interpolation: InterpolationType::Bezier,
        angles: AngleRepresentation::Quaternion,
    })
    .with_ik(IkCorrection::for_skeleton(&asf.skeleton).unwrap());
    let output = interpolator.interpolate(&motion, &schedule).unwrap();

    for &frame in schedule.frames() {
        assert_eq!(output.posture(frame), motion.posture(frame));
    }

    // Quaternion blending can move a bone off its declared axes
    let options = AmcWriteOptions {
        force_all_three_dofs: true,
    };
    let mut text = Vec::new();
    write_amc(&mut text, &output, &asf, &options).unwrap();
    let reread = parse_amc(&String::from_utf8(text).unwrap(), &asf).unwrap();
    assert_motions_close(&reread, &output);
}

#[test]
fn test_keyframe_list_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keys.txt");
    fs::write(&path, "# hand-picked\n0 6 12\n18 24\n").unwrap();

    let schedule = load_keyframe_list(&path).unwrap();
    assert_eq!(schedule.frames(), &[0, 6, 12, 18, 24]);
    schedule.check_fits(walk(&subject()).frame_count()).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let error = AsfSkeleton::load(data_path("missing.asf"), MOCAP_SCALE).unwrap_err();
    assert!(matches!(error, asf_amc::AsfAmcError::Io(_)));
}
