//! Interpolation of a humanoid motion, with and without IK correction

use super::fixtures::{humanoid, swinging_motion};
use mocap_kinematics::{
    AngleRepresentation, IkCorrection, InterpolationType, Interpolator, InterpolatorConfig,
    KeyframeSchedule, LimbChain, compute_tip_positions,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case(InterpolationType::Linear, AngleRepresentation::Euler)]
#[test_case(InterpolationType::Linear, AngleRepresentation::Quaternion)]
#[test_case(InterpolationType::Bezier, AngleRepresentation::Euler)]
#[test_case(InterpolationType::Bezier, AngleRepresentation::Quaternion)]
fn test_keyframes_survive_every_mode(
    interpolation: InterpolationType,
    angles: AngleRepresentation,
) {
    let input = swinging_motion(60);
    let schedule = KeyframeSchedule::uniform(5, input.frame_count()).unwrap();
    assert_eq!(schedule.last(), 54);

    let output = Interpolator::new(InterpolatorConfig {
        interpolation,
        angles,
    })
    .interpolate(&input, &schedule)
    .unwrap();

    assert_eq!(output.frame_count(), 60);
    assert_eq!(output.bone_count(), input.bone_count());
    for &frame in schedule.frames() {
        assert_eq!(output.posture(frame), input.posture(frame), "keyframe {frame}");
    }
    for frame in 55..60 {
        assert_eq!(output.posture(frame), input.posture(frame), "trailing frame {frame}");
    }
}

#[test]
fn test_ik_correction_on_humanoid() {
    let _ = env_logger::builder().is_test(true).try_init();

    let skeleton = humanoid();
    let input = swinging_motion(21);
    let schedule = KeyframeSchedule::uniform(4, input.frame_count()).unwrap();
    let config = InterpolatorConfig {
        interpolation: InterpolationType::Linear,
        angles: AngleRepresentation::Quaternion,
    };

    let plain = Interpolator::new(config).interpolate(&input, &schedule).unwrap();
    let correction = IkCorrection::for_skeleton(&skeleton).unwrap();
    let relaxed = correction.skeleton.clone();
    let corrected = Interpolator::new(config)
        .with_ik(correction)
        .interpolate(&input, &schedule)
        .unwrap();

    for &frame in schedule.frames() {
        assert_eq!(corrected.posture(frame), input.posture(frame));
    }

    let chains = LimbChain::resolve(&skeleton).unwrap();
    for frame in (0..21).filter(|frame| frame % 4 != 0) {
        let original = input.posture(frame).unwrap();
        let fixed = corrected.posture(frame).unwrap();
        assert_eq!(fixed.root_position, original.root_position);

        let mut uncorrected = plain.posture(frame).unwrap().clone();
        uncorrected.root_position = original.root_position;

        let goals = compute_tip_positions(&relaxed, original).unwrap();
        let before = compute_tip_positions(&relaxed, &uncorrected).unwrap();
        let after = compute_tip_positions(&relaxed, fixed).unwrap();

        for limb in &chains {
            let end = limb.chain.end;
            assert!(
                after[end].distance(goals[end]) <= before[end].distance(goals[end]) + 1e-12,
                "frame {frame}, {}",
                limb.limb
            );
        }

        // Spine and head are outside every chain
        for bone in [11, 12, 13, 14, 15, 16] {
            assert_eq!(fixed.bone_rotations[bone], uncorrected.bone_rotations[bone]);
        }
        // The knee only bends about x in the source data
        assert_eq!(fixed.bone_rotations[3].y, uncorrected.bone_rotations[3].y);
        assert_eq!(fixed.bone_rotations[3].z, uncorrected.bone_rotations[3].z);
    }
}
