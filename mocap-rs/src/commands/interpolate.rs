//! Keyframe interpolation command

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use console::style;
use std::path::PathBuf;
use std::time::Instant;

use asf_amc::{AmcWriteOptions, AsfSkeleton, MOCAP_SCALE, load_amc, load_keyframe_list, save_amc};
use mocap_kinematics::{
    AngleRepresentation, IkCorrection, InterpolationType, Interpolator, InterpolatorConfig,
    KeyframeSchedule,
};

#[derive(Args)]
#[command(group(ArgGroup::new("spacing").required(true).args(["skip", "keyframes"])))]
pub struct InterpolateArgs {
    /// Path to the ASF skeleton
    pub asf: PathBuf,

    /// Path to the input AMC motion
    pub amc: PathBuf,

    /// Path to write the interpolated AMC motion
    #[arg(short, long)]
    pub output: PathBuf,

    /// Interpolation type: l/linear or b/bezier
    #[arg(short = 'm', long = "method", default_value = "linear")]
    pub interpolation: InterpolationType,

    /// Angle representation: e/euler or q/quaternion
    #[arg(short, long, default_value = "euler")]
    pub angles: AngleRepresentation,

    /// Number of frames skipped between consecutive keyframes
    #[arg(short, long)]
    pub skip: Option<usize>,

    /// File listing keyframe indices
    #[arg(short, long, value_name = "FILE")]
    pub keyframes: Option<PathBuf>,

    /// Correct limb end positions with inverse kinematics (quaternion only)
    #[arg(long)]
    pub ik: bool,

    /// Scale applied to bone lengths and root translations
    #[arg(long, default_value_t = MOCAP_SCALE)]
    pub scale: f64,

    /// Write rx ry rz for every bone instead of its declared channels
    /// (the default for quaternion output)
    #[arg(long)]
    pub all_dofs: bool,

    /// Write only each bone's declared channels, even for quaternion output
    #[arg(long, conflicts_with = "all_dofs")]
    pub declared_dofs: bool,
}

pub fn execute(args: InterpolateArgs) -> Result<()> {
    let asf = AsfSkeleton::load(&args.asf, args.scale)
        .with_context(|| format!("Failed to load ASF file: {}", args.asf.display()))?;
    let input = load_amc(&args.amc, &asf)
        .with_context(|| format!("Failed to load AMC file: {}", args.amc.display()))?;

    let schedule = match (&args.keyframes, args.skip) {
        (Some(path), _) => load_keyframe_list(path)
            .with_context(|| format!("Failed to load keyframe list: {}", path.display()))?,
        (None, Some(skip)) => KeyframeSchedule::uniform(skip, input.frame_count())
            .context("Failed to build keyframe schedule")?,
        (None, None) => anyhow::bail!("Either --skip or --keyframes is required"),
    };

    let mut interpolator = Interpolator::new(InterpolatorConfig {
        interpolation: args.interpolation,
        angles: args.angles,
    });
    if args.ik {
        let correction = IkCorrection::for_skeleton(&asf.skeleton)
            .context("Skeleton has no usable limb chains for IK")?;
        interpolator = interpolator.with_ik(correction);
    }

    let started = Instant::now();
    let output = interpolator
        .interpolate(&input, &schedule)
        .context("Interpolation failed")?;
    let elapsed = started.elapsed();

    let options = AmcWriteOptions {
        force_all_three_dofs: !args.declared_dofs
            && (args.all_dofs || args.angles == AngleRepresentation::Quaternion),
    };
    if args.declared_dofs && args.angles == AngleRepresentation::Quaternion {
        log::warn!("Rotations about undeclared axes are dropped from the output");
    }
    save_amc(&args.output, &output, &asf, &options)
        .with_context(|| format!("Failed to write AMC file: {}", args.output.display()))?;

    println!(
        "✓ Interpolated {} frames from {} keyframes ({} {}{}) in {:.2?}",
        style(output.frame_count()).green(),
        style(schedule.len()).green(),
        style(args.interpolation).yellow(),
        style(args.angles).yellow(),
        if args.ik { " + IK" } else { "" },
        elapsed
    );
    println!("  Wrote {}", style(args.output.display()).cyan());

    Ok(())
}
