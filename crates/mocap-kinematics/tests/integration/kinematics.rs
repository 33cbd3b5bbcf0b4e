//! FK and IK on a full humanoid skeleton

use super::fixtures::{BONE_COUNT, humanoid, posed};
use glam::DVec3;
use mocap_kinematics::{
    BoneChain, IkSolver, KinematicsError, LimbChain, Posture, Skeleton, compute_tip_positions,
};
use pretty_assertions::assert_eq;

fn assert_vec_close(a: DVec3, b: DVec3) {
    assert!((a - b).length() < 1e-9, "expected {b:?}, got {a:?}");
}

#[test]
fn test_named_chains_match_default_indices() {
    let skeleton = humanoid();
    assert_eq!(skeleton.bone_count(), BONE_COUNT);
    assert_eq!(
        LimbChain::resolve(&skeleton).unwrap(),
        LimbChain::CMU_DEFAULT.to_vec()
    );
    assert_eq!(
        skeleton.chain(18, 21).unwrap(),
        vec![18, 19, 20, 21]
    );
}

#[test]
fn test_rest_pose_tips() {
    let skeleton = humanoid();
    let tips = compute_tip_positions(&skeleton, &Posture::rest(BONE_COUNT)).unwrap();

    assert_vec_close(tips[Skeleton::ROOT], DVec3::ZERO);
    assert_vec_close(tips[1], DVec3::new(0.09, -0.12, 0.0));
    // Spine and neck stack straight up
    assert_vec_close(tips[16], DVec3::new(0.0, 0.66, 0.0));
    // Both clavicles hang off the thorax tip
    let shoulder = DVec3::new(1.0, 0.2, 0.0).normalize() * 0.2;
    assert_vec_close(tips[17], DVec3::new(0.0, 0.36, 0.0) + shoulder);
}

#[test]
fn test_root_translation_moves_every_tip() {
    let skeleton = humanoid();
    let rest = compute_tip_positions(&skeleton, &Posture::rest(BONE_COUNT)).unwrap();

    let mut moved = Posture::rest(BONE_COUNT);
    moved.root_position = DVec3::new(1.0, -2.0, 0.5);
    let shifted = compute_tip_positions(&skeleton, &moved).unwrap();

    for (a, b) in rest.positions().iter().zip(shifted.positions()) {
        assert_vec_close(*b - *a, moved.root_position);
    }
}

#[test]
fn test_ik_recovers_every_limb_from_rest() {
    let _ = env_logger::builder().is_test(true).try_init();

    let skeleton = humanoid();
    let mask = skeleton.dof_mask();
    let target = posed(1.0);
    let goals = compute_tip_positions(&skeleton, &target).unwrap();

    let mut posture = Posture::rest(BONE_COUNT);
    posture.root_position = target.root_position;

    let solver = IkSolver::default();
    for limb in LimbChain::CMU_DEFAULT {
        let goal = goals[limb.chain.end];
        let solution = solver
            .solve(&skeleton, &mask, limb.chain, goal, &posture)
            .unwrap();
        assert!(solution.converged, "{} did not converge", limb.limb);
        posture = solution.posture;
    }

    // The four chains are disjoint, so later solves keep earlier tips in place
    let tips = compute_tip_positions(&skeleton, &posture).unwrap();
    for limb in LimbChain::CMU_DEFAULT {
        let end = limb.chain.end;
        assert!(tips[end].distance(goals[end]) < 0.025, "{}", limb.limb);
    }

    // Bones outside every chain are never touched
    for bone in [0, 1, 6, 11, 12, 13, 16, 17, 24] {
        assert_eq!(posture.bone_rotations[bone], DVec3::ZERO);
    }
}

#[test]
fn test_ik_rejects_chain_across_branches() {
    let skeleton = humanoid();
    let result = IkSolver::default().solve(
        &skeleton,
        &skeleton.dof_mask(),
        BoneChain::new(18, 4),
        DVec3::ZERO,
        &Posture::rest(BONE_COUNT),
    );
    assert_eq!(result, Err(KinematicsError::InvalidChain { start: 18, end: 4 }));
}
