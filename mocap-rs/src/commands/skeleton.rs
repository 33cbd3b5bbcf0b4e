//! ASF skeleton inspection command

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use asf_amc::{AsfSkeleton, MOCAP_SCALE};
use mocap_kinematics::{LimbChain, Skeleton};

use crate::utils::{NodeType, TreeNode, TreeOptions, format_channels, format_dofs, render_tree};

#[derive(Args)]
pub struct SkeletonArgs {
    /// Path to the ASF skeleton
    pub file: PathBuf,

    /// Scale applied to bone lengths
    #[arg(long, default_value_t = MOCAP_SCALE)]
    pub scale: f64,

    /// Maximum depth to display
    #[arg(long)]
    pub depth: Option<usize>,

    /// Hide per-bone details
    #[arg(long)]
    pub no_metadata: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show compact metadata inline
    #[arg(long)]
    pub compact: bool,
}

pub fn execute(args: SkeletonArgs) -> Result<()> {
    let asf = AsfSkeleton::load(&args.file, args.scale)
        .with_context(|| format!("Failed to load ASF file: {}", args.file.display()))?;

    let name = asf
        .name
        .clone()
        .unwrap_or_else(|| args.file.display().to_string());
    let mut root = TreeNode::new(name, NodeType::Skeleton);
    if let Some(version) = &asf.version {
        root = root.with_metadata("version", version.as_str());
    }
    root = root
        .with_metadata("bones", asf.bone_count().to_string())
        .add_child(build_bone_node(&asf, Skeleton::ROOT));

    let options = TreeOptions {
        max_depth: args.depth,
        no_color: args.no_color,
        show_metadata: !args.no_metadata,
        compact: args.compact,
    };
    print!("{}", render_tree(&root, &options));

    match LimbChain::resolve(&asf.skeleton) {
        Ok(chains) => {
            println!("\n{}", style("IK chains").bold().underlined());
            for limb in chains {
                let bone_name = |index| {
                    asf.skeleton
                        .bone(index)
                        .ok()
                        .and_then(|bone| bone.name())
                        .unwrap_or("?")
                };
                println!(
                    "  {:<10} {} → {} ({})",
                    limb.limb.to_string(),
                    style(bone_name(limb.chain.start)).green(),
                    style(bone_name(limb.chain.end)).green(),
                    limb.chain
                );
            }
        }
        Err(err) => log::info!("No CMU limb chains: {}", err),
    }

    Ok(())
}

fn build_bone_node(asf: &AsfSkeleton, index: usize) -> TreeNode {
    let skeleton = &asf.skeleton;
    let Ok(bone) = skeleton.bone(index) else {
        return TreeNode::new(format!("#{index}"), NodeType::Bone);
    };

    let mut children = skeleton.children(index).peekable();
    let node_type = if index == Skeleton::ROOT {
        NodeType::Root
    } else if children.peek().is_none() {
        NodeType::EndEffector
    } else {
        NodeType::Bone
    };

    let label = format!("{} [{}]", bone.name().unwrap_or("?"), index);
    let mut node = TreeNode::new(label, node_type);
    if index == Skeleton::ROOT {
        node = node.with_metadata("order", format_channels(asf.channels(index)));
    } else {
        node = node
            .with_metadata("dofs", format_dofs(bone.dofs()))
            .with_metadata("length", format!("{:.4}", bone.length()));
    }
    if bone.axis() != glam::DVec3::ZERO {
        node = node.with_metadata("axis", crate::utils::format_vec3(bone.axis()));
    }

    for child in children {
        node = node.add_child(build_bone_node(asf, child));
    }
    node
}
