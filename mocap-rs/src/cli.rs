//! Root CLI structure for mocap-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mocap-rs")]
#[command(
    about = "Keyframe interpolation and inverse kinematics for ASF/AMC motion capture",
    long_about = None
)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the frames between keyframes of an AMC motion
    Interpolate(crate::commands::interpolate::InterpolateArgs),

    /// Show the bone hierarchy of an ASF skeleton
    Skeleton(crate::commands::skeleton::SkeletonArgs),

    /// Solve a bone chain towards a goal from the rest posture
    Ik(crate::commands::ik::IkArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
