use jointkit_core::{ChildStrategy, JointResult};
use jointkit_scene::{NodeId, NodeKind};

use crate::hierarchy::ChildBracket;
use crate::host::SceneHost;
use crate::report::{JointOutcome, JointReport, OrientReport};
use crate::selection::SelectionScope;
use crate::solver::inherit_parent_frame;

/// Clear orient, rotation and rotate axis on each joint. Children keep their
/// world transforms. Running it twice gives the same result as once.
pub fn reset_orients<H: SceneHost + ?Sized>(
    host: &mut H,
    joints: &[NodeId],
    children: ChildStrategy,
) -> OrientReport {
    run_each(host, joints, children, "reset orients", |host, bracket| {
        host.reset_channels(bracket.joint())?;
        Ok(JointOutcome::Reset)
    })
}

/// Give each joint its parent's frame, leaving an identity orient relative
/// to the parent. Joints without a parent are left alone.
pub fn copy_parent_orients<H: SceneHost + ?Sized>(
    host: &mut H,
    joints: &[NodeId],
    children: ChildStrategy,
) -> OrientReport {
    run_each(host, joints, children, "copy parent orients", |host, bracket| {
        let joint = bracket.joint();
        match bracket.parent() {
            Some(parent) => {
                inherit_parent_frame(host, joint, parent)?;
                Ok(JointOutcome::Inherited)
            }
            None => {
                tracing::debug!("{} has no parent, nothing to copy", host.label(joint));
                Ok(JointOutcome::Skipped {
                    reason: "no parent".to_string(),
                })
            }
        }
    })
}

/// Shared per-joint loop: kind check, child bracket, `apply`, restore.
fn run_each<H, F>(
    host: &mut H,
    joints: &[NodeId],
    children: ChildStrategy,
    operation: &str,
    mut apply: F,
) -> OrientReport
where
    H: SceneHost + ?Sized,
    F: FnMut(&mut H, &ChildBracket) -> JointResult<JointOutcome>,
{
    let mut scope = SelectionScope::enter(host);
    let mut report = OrientReport::default();

    for &joint in joints {
        let host: &mut H = &mut scope;
        let mut entry = JointReport {
            joint,
            name: host.label(joint),
            outcome: JointOutcome::Reset,
            unrestored_children: Vec::new(),
        };

        let result = match host.kind(joint) {
            Ok(NodeKind::Joint) => match ChildBracket::open(host, joint, children) {
                Ok(bracket) => {
                    let result = apply(host, &bracket);
                    entry.unrestored_children = bracket.close(host);
                    result
                }
                Err(err) => Err(err),
            },
            Ok(kind) => Ok(JointOutcome::Skipped {
                reason: format!("{kind} is not a joint"),
            }),
            Err(err) => Err(err),
        };

        entry.outcome = result.unwrap_or_else(|err| {
            tracing::debug!("{} failed on {}: {}", operation, entry.name, err);
            JointOutcome::Failed {
                error: err.to_string(),
            }
        });
        report.joints.push(entry);
    }

    if let Err(err) = scope.finish() {
        tracing::debug!("selection not restored after {}: {}", operation, err);
        report.selection_restored = false;
    }
    tracing::info!("{}: {}", operation, report.summary());
    report
}
