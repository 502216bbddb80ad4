use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::DVec3;
use serde::Serialize;

use jointkit_core::math::orient_degrees;
use jointkit_core::{Axis, ChildStrategy, ContinuityScope, OrientConfig};
use jointkit_orient::{
    copy_parent_orients, orient_joints, reset_orients, JointOutcome, OrientReport, OrientRequest,
};
use jointkit_scene::validate::validate_scene;
use jointkit_scene::{ChainBuilder, KindFilter, Node, NodeId, NodeKind, Scene};

#[derive(Parser)]
#[command(
    name = "jointkit",
    version,
    about = "jointkit: orient joint chains in scene files",
    long_about = "Rebuilds joint orients so each joint's aim axis points down the chain,\nwithout moving anything in the scene."
)]
struct Cli {
    /// Print machine-readable JSON on stdout; logs go to stderr
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Orient joints so their aim axis points at their first joint child
    Orient {
        #[command(flatten)]
        target: TargetArgs,

        /// Local aim axis, e.g. x, -z or 1,0,0
        #[arg(long, allow_hyphen_values = true)]
        aim: Option<Axis>,

        /// Local up axis
        #[arg(long, allow_hyphen_values = true)]
        up: Option<Axis>,

        /// World-space up hint, also used as the fallback up vector
        #[arg(long, allow_hyphen_values = true)]
        up_dir: Option<Axis>,

        /// Derive the up vector from each joint's neighbours
        #[arg(long)]
        auto_up: bool,

        /// Restart flip correction whenever a new chain begins
        #[arg(long)]
        per_chain: bool,

        /// TOML file with an orient configuration; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Clear joint orients back to identity
    Reset {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Give joints their parent's frame
    CopyParent {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Print the hierarchy with world positions and orients
    Inspect {
        /// Scene file to read
        #[arg()]
        scene: PathBuf,
    },

    /// Write a sample arm rig to get started with
    Demo {
        /// Output scene file
        #[arg(short, long, default_value = "demo_arm.json")]
        output: PathBuf,
    },

    /// Check a scene file for broken links and bad channel values
    Validate {
        /// Scene file to check
        #[arg()]
        scene: PathBuf,
    },
}

/// Arguments shared by the commands that edit joints.
#[derive(Args)]
struct TargetArgs {
    /// Scene file to edit
    #[arg()]
    scene: PathBuf,

    /// Comma-separated joint names, in processing order (default: every joint)
    #[arg(long, value_delimiter = ',')]
    joints: Vec<String>,

    /// Move children to world space and back instead of compensating them
    #[arg(long)]
    detach: bool,

    /// Write the edited scene here instead of over the input
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TargetArgs {
    fn strategy(&self) -> ChildStrategy {
        if self.detach {
            ChildStrategy::Detach
        } else {
            ChildStrategy::Compensate
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    );

    if cli.json {
        // Keep stdout clean for the JSON document.
        subscriber
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        subscriber.init();
    }

    let json = cli.json;
    match cli.command {
        Commands::Orient {
            target,
            aim,
            up,
            up_dir,
            auto_up,
            per_chain,
            config,
        } => {
            let mut config = match config {
                Some(path) => OrientConfig::load_from_file(&path)
                    .with_context(|| format!("failed to load config: {}", path.display()))?,
                None => OrientConfig::default(),
            };
            if let Some(aim) = aim {
                config.aim_axis = aim;
            }
            if let Some(up) = up {
                config.up_axis = up;
            }
            if let Some(up_dir) = up_dir {
                config.up_direction = up_dir;
            }
            if auto_up {
                config.auto_detect_up = true;
            }
            if per_chain {
                config.continuity = ContinuityScope::PerChain;
            }
            config.children = target.strategy();
            cmd_orient(&target, config, json)
        }
        Commands::Reset { target } => cmd_edit(&target, json, |scene, joints, strategy| {
            reset_orients(scene, joints, strategy)
        }),
        Commands::CopyParent { target } => cmd_edit(&target, json, |scene, joints, strategy| {
            copy_parent_orients(scene, joints, strategy)
        }),
        Commands::Inspect { scene } => cmd_inspect(&scene, json),
        Commands::Demo { output } => cmd_demo(&output),
        Commands::Validate { scene } => cmd_validate(&scene),
    }
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::load_from_file(path)
        .with_context(|| format!("failed to load scene: {}", path.display()))
}

/// Resolve joint names in the order given, or every joint in scene order.
fn resolve_joints(scene: &Scene, names: &[String]) -> Result<Vec<NodeId>> {
    if names.is_empty() {
        return Ok(scene
            .iter()
            .filter(|n| n.kind == NodeKind::Joint)
            .map(|n| n.id)
            .collect());
    }
    names
        .iter()
        .map(|name| {
            scene
                .find_by_name(name)
                .with_context(|| format!("no node named '{name}' in scene '{}'", scene.name))
        })
        .collect()
}

fn cmd_orient(target: &TargetArgs, config: OrientConfig, json: bool) -> Result<()> {
    let mut scene = load_scene(&target.scene)?;
    let joints = resolve_joints(&scene, &target.joints)?;
    tracing::info!(
        "Orienting {} joint(s) in {} (aim {}, up {}, hint {})",
        joints.len(),
        target.scene.display(),
        config.aim_axis,
        config.up_axis,
        config.up_direction
    );

    let request = OrientRequest::new(joints).with_config(config);
    let report = orient_joints(&mut scene, &request).context("orient configuration rejected")?;
    finish_edit(&scene, target, &report, json)
}

fn cmd_edit<F>(target: &TargetArgs, json: bool, run: F) -> Result<()>
where
    F: FnOnce(&mut Scene, &[NodeId], ChildStrategy) -> OrientReport,
{
    let mut scene = load_scene(&target.scene)?;
    let joints = resolve_joints(&scene, &target.joints)?;
    let report = run(&mut scene, &joints, target.strategy());
    finish_edit(&scene, target, &report, json)
}

/// Save the scene, print the report, and fail if any joint failed.
fn finish_edit(
    scene: &Scene,
    target: &TargetArgs,
    report: &OrientReport,
    json: bool,
) -> Result<()> {
    let out = target.output.as_ref().unwrap_or(&target.scene);
    scene
        .save_to_file(out)
        .with_context(|| format!("failed to write scene: {}", out.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(report);
        println!("   Wrote {}", out.display());
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{failed} joint(s) failed");
    }
    Ok(())
}

fn print_report(report: &OrientReport) {
    for entry in &report.joints {
        let status = match &entry.outcome {
            JointOutcome::Solved {
                up,
                up_source,
                flipped,
            } => {
                let flip = if *flipped { ", flipped" } else { "" };
                format!("solved (up {up:.3} from {up_source:?}{flip})")
            }
            JointOutcome::Inherited => "inherited parent frame".to_string(),
            JointOutcome::Reset => "reset".to_string(),
            JointOutcome::Skipped { reason } => format!("skipped: {reason}"),
            JointOutcome::Failed { error } => format!("FAILED: {error}"),
        };
        println!("   {:<16} {}", entry.name, status);
        if !entry.unrestored_children.is_empty() {
            println!(
                "   {:<16} {} child(ren) could not be put back",
                "",
                entry.unrestored_children.len()
            );
        }
    }
    if !report.selection_restored {
        println!("   Selection could not be restored");
    }
    println!("   {}", report.summary());
}

#[derive(Serialize)]
struct InspectRow {
    name: String,
    kind: NodeKind,
    depth: usize,
    world_position: DVec3,
    orient_degrees: DVec3,
}

fn cmd_inspect(path: &Path, json: bool) -> Result<()> {
    let scene = load_scene(path)?;
    let mut rows = Vec::with_capacity(scene.len());
    for root in scene.roots() {
        collect_rows(&scene, root, 0, &mut rows)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Scene '{}' ({} nodes)", scene.name, scene.len());
    for row in &rows {
        let p = row.world_position;
        let o = row.orient_degrees;
        println!(
            "{:indent$}{} [{}]  pos ({:.3}, {:.3}, {:.3})  orient ({:.2}, {:.2}, {:.2})",
            "",
            row.name,
            row.kind,
            p.x,
            p.y,
            p.z,
            o.x,
            o.y,
            o.z,
            indent = row.depth * 2
        );
    }
    Ok(())
}

fn collect_rows(
    scene: &Scene,
    id: NodeId,
    depth: usize,
    rows: &mut Vec<InspectRow>,
) -> Result<()> {
    let node = scene.node(id)?;
    rows.push(InspectRow {
        name: node.name.clone(),
        kind: node.kind,
        depth,
        world_position: scene.world_position(id)?,
        orient_degrees: orient_degrees(node.joint_orient),
    });
    for child in scene.children(id, KindFilter::Any)? {
        collect_rows(scene, child, depth + 1, rows)?;
    }
    Ok(())
}

fn cmd_demo(output: &Path) -> Result<()> {
    let mut scene = Scene::new("demo_arm");
    let arm = ChainBuilder::new()
        .joint("shoulder", DVec3::new(0.0, 14.0, 0.0))
        .joint("elbow", DVec3::new(3.0, 14.0, -0.4))
        .joint("wrist", DVec3::new(6.0, 14.0, 0.0))
        .joint("hand", DVec3::new(7.0, 14.0, 0.0))
        .build(&mut scene)?;
    let wrist = arm[2];
    ChainBuilder::new()
        .under(wrist)
        .joint("index1", DVec3::new(6.6, 14.1, 0.3))
        .joint("index2", DVec3::new(7.3, 14.0, 0.35))
        .joint("index3", DVec3::new(7.8, 13.8, 0.35))
        .build(&mut scene)?;
    scene.add_node(
        Some(arm[1]),
        Node::new(NodeKind::Transform, "elbow_pole")
            .with_translation(DVec3::new(0.0, 0.0, -2.0)),
    )?;
    scene.add_node(
        Some(arm[1]),
        Node::new(NodeKind::Shape, "elbow_shape").with_translation(DVec3::new(0.0, 0.6, 0.0)),
    )?;

    scene
        .save_to_file(output)
        .with_context(|| format!("failed to write scene: {}", output.display()))?;
    println!("   Wrote demo rig ({} nodes) to {}", scene.len(), output.display());
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<()> {
    let scene = load_scene(path)?;
    println!("Checking {}", path.display());
    match validate_scene(&scene) {
        Ok(()) => {
            println!("   OK ({} nodes)", scene.len());
            Ok(())
        }
        Err(errors) => {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("Validation failed:\n  {}", msgs.join("\n  "));
        }
    }
}
