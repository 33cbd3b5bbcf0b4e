//! Single-chain IK command

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use glam::DVec3;
use std::path::PathBuf;

use asf_amc::{AsfSkeleton, MOCAP_SCALE};
use mocap_kinematics::{BoneChain, IkSolver, IkSolverConfig, Posture, compute_tip_positions};

use crate::utils::format_vec3;

#[derive(Args)]
pub struct IkArgs {
    /// Path to the ASF skeleton
    pub asf: PathBuf,

    /// First bone of the chain, by name or index
    #[arg(long)]
    pub start: String,

    /// Last bone of the chain, by name or index
    #[arg(long)]
    pub end: String,

    /// Goal position for the tip of the end bone, as x,y,z
    #[arg(long, value_parser = parse_goal, allow_hyphen_values = true)]
    pub goal: DVec3,

    /// Scale applied to bone lengths
    #[arg(long, default_value_t = MOCAP_SCALE)]
    pub scale: f64,

    /// Iteration cap
    #[arg(long, default_value_t = 300)]
    pub max_iterations: usize,

    /// Tip distance below which the goal counts as reached
    #[arg(long, default_value_t = 0.025)]
    pub accepted_error: f64,

    /// Fraction of each pseudoinverse step to apply
    #[arg(long, default_value_t = 0.05)]
    pub step_size: f64,
}

fn parse_goal(value: &str) -> std::result::Result<DVec3, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid goal '{value}': {e}"))?;
    match parts.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(format!("goal must be x,y,z, got '{value}'")),
    }
}

fn resolve_bone(asf: &AsfSkeleton, bone: &str) -> Result<usize> {
    if let Some(index) = asf.bone_index(bone) {
        return Ok(index);
    }
    match bone.parse::<usize>() {
        Ok(index) if index < asf.bone_count() => Ok(index),
        _ => anyhow::bail!("Unknown bone: {}", bone),
    }
}

pub fn execute(args: IkArgs) -> Result<()> {
    let asf = AsfSkeleton::load(&args.asf, args.scale)
        .with_context(|| format!("Failed to load ASF file: {}", args.asf.display()))?;
    let chain = BoneChain::new(resolve_bone(&asf, &args.start)?, resolve_bone(&asf, &args.end)?);

    let solver = IkSolver::new(IkSolverConfig {
        max_iterations: args.max_iterations,
        accepted_error: args.accepted_error,
        step_size: args.step_size,
        ..IkSolverConfig::default()
    });

    let skeleton = &asf.skeleton;
    let mut rest = Posture::rest(skeleton.bone_count());
    rest.root_position = asf.root_position * asf.scale;
    let start_tip = compute_tip_positions(skeleton, &rest)?[chain.end];

    let solution = solver
        .solve(skeleton, &skeleton.dof_mask(), chain, args.goal, &rest)
        .with_context(|| format!("Failed to solve chain {chain}"))?;
    let tips = compute_tip_positions(skeleton, &solution.posture)?;

    println!("\n{}", style("IK Solution").bold().underlined());
    println!("Chain: {} ({} → {})", style(chain).cyan(), args.start, args.end);
    println!("Goal: {}", format_vec3(args.goal));
    println!("Start tip: {}", format_vec3(start_tip));
    println!("Final tip: {}", format_vec3(tips[chain.end]));
    println!("Residual: {:.6}", solution.residual);
    println!("Iterations: {}", solution.iterations);
    if solution.converged {
        println!("Status: {}", style("converged").green());
    } else {
        println!("Status: {}", style("not converged").yellow());
    }

    println!("\n{}", style("Bone rotations (degrees)").bold());
    for bone in skeleton.chain(chain.start, chain.end)? {
        let name = skeleton.bone(bone)?.name().unwrap_or("?");
        println!(
            "  {:<12} {}",
            name,
            format_vec3(solution.posture.bone_rotations[bone])
        );
    }

    Ok(())
}
