use criterion::{Criterion, criterion_group, criterion_main};
use glam::DVec3;
use mocap_kinematics::{
    AngleRepresentation, BoneChain, BoneSpec, IkSolver, InterpolationType, Interpolator,
    InterpolatorConfig, KeyframeSchedule, Motion, Posture, RotationalDofs, Skeleton,
    SkeletonBuilder, compute_tip_positions,
};
use std::hint::black_box;

/// Chain of `length` unit bones, each free about every axis
fn create_test_skeleton(length: usize) -> Skeleton {
    let mut builder = SkeletonBuilder::new(DVec3::ZERO, RotationalDofs::ALL);
    let mut parent = 0;
    for index in 0..length {
        let bone = builder.add_bone(
            BoneSpec::new(format!("bone{index}"), DVec3::X, 1.0).with_dofs(RotationalDofs::ALL),
        );
        // Bones were just added in order, so attaching cannot fail
        builder.attach(parent, bone).unwrap();
        parent = bone;
    }
    builder.build().unwrap()
}

fn create_test_motion(frame_count: usize, bone_count: usize) -> Motion {
    let frames = (0..frame_count)
        .map(|frame| {
            let f = frame as f64;
            Posture {
                root_position: DVec3::new(f * 0.1, 0.0, 0.0),
                bone_rotations: (0..bone_count)
                    .map(|bone| DVec3::splat((f * 0.1 + bone as f64).sin() * 30.0))
                    .collect(),
            }
        })
        .collect();
    Motion::from_frames(bone_count, frames).unwrap()
}

fn bench_forward_kinematics(c: &mut Criterion) {
    let skeleton = create_test_skeleton(30);
    let posture = create_test_motion(1, skeleton.bone_count())
        .posture(0)
        .cloned()
        .unwrap();

    c.bench_function("fk_31_bones", |b| {
        b.iter(|| compute_tip_positions(black_box(&skeleton), black_box(&posture)).unwrap())
    });
}

fn bench_ik_solve(c: &mut Criterion) {
    let skeleton = create_test_skeleton(3);
    let mask = skeleton.dof_mask();
    let solver = IkSolver::default();
    let rest = Posture::rest(skeleton.bone_count());

    c.bench_function("ik_three_bone_chain", |b| {
        b.iter(|| {
            solver
                .solve(
                    &skeleton,
                    &mask,
                    BoneChain::new(1, 3),
                    black_box(DVec3::new(1.5, 1.5, 0.5)),
                    &rest,
                )
                .unwrap()
        })
    });
}

fn bench_interpolation(c: &mut Criterion) {
    let motion = create_test_motion(240, 31);
    let schedule = KeyframeSchedule::uniform(9, motion.frame_count()).unwrap();

    for (name, interpolation, angles) in [
        ("linear_euler", InterpolationType::Linear, AngleRepresentation::Euler),
        ("bezier_quaternion", InterpolationType::Bezier, AngleRepresentation::Quaternion),
    ] {
        let interpolator = Interpolator::new(InterpolatorConfig {
            interpolation,
            angles,
        });
        c.bench_function(name, |b| {
            b.iter(|| interpolator.interpolate(black_box(&motion), &schedule).unwrap())
        });
    }
}

criterion_group!(
    benches,
    bench_forward_kinematics,
    bench_ik_solve,
    bench_interpolation
);
criterion_main!(benches);
