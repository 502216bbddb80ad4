use std::f64::consts::PI;

use glam::DQuat;

use jointkit_core::{JointError, JointResult, OrientConfig};
use jointkit_scene::{NodeId, NodeKind};

use crate::aim::{look_at, AimAxes};
use crate::continuity::ContinuityTracker;
use crate::hierarchy::ChildBracket;
use crate::host::SceneHost;
use crate::report::{JointOutcome, JointReport, OrientReport};
use crate::selection::SelectionScope;
use crate::up::choose_up;

/// Joints to orient, in processing order, and how to orient them.
#[derive(Debug, Clone)]
pub struct OrientRequest {
    pub joints: Vec<NodeId>,
    pub config: OrientConfig,
}

impl OrientRequest {
    /// Request with the default configuration (aim +X, up +Y, hint +Y).
    pub fn new(joints: Vec<NodeId>) -> Self {
        Self {
            joints,
            config: OrientConfig::default(),
        }
    }

    /// Builder: replace the configuration.
    pub fn with_config(mut self, config: OrientConfig) -> Self {
        self.config = config;
        self
    }
}

/// Orient every joint in `request.joints`, in order.
///
/// A joint with a joint child aims at the first one; a joint without takes
/// its parent's frame. Children keep their world transforms and the host's
/// selection is restored at the end. Only an unusable configuration is an
/// error; per-joint problems are recorded in the report and the run goes on.
pub fn orient_joints<H: SceneHost + ?Sized>(
    host: &mut H,
    request: &OrientRequest,
) -> JointResult<OrientReport> {
    let config = &request.config;
    config.validate()?;
    let axes = AimAxes::new(config.aim_axis.vec(), config.up_axis.vec())?;

    let mut scope = SelectionScope::enter(host);
    let mut tracker = ContinuityTracker::new(config.continuity);
    let mut report = OrientReport::default();

    for &joint in &request.joints {
        report
            .joints
            .push(orient_one(&mut *scope, joint, &axes, config, &mut tracker));
    }

    if let Err(err) = scope.finish() {
        tracing::debug!("selection not restored after orienting joints: {}", err);
        report.selection_restored = false;
    }
    tracing::info!("orient joints: {}", report.summary());
    Ok(report)
}

fn orient_one<H: SceneHost + ?Sized>(
    host: &mut H,
    joint: NodeId,
    axes: &AimAxes,
    config: &OrientConfig,
    tracker: &mut ContinuityTracker,
) -> JointReport {
    let name = host.label(joint);
    let mut entry = JointReport {
        joint,
        name,
        outcome: JointOutcome::Inherited,
        unrestored_children: Vec::new(),
    };

    match host.kind(joint) {
        Ok(NodeKind::Joint) => {}
        Ok(kind) => {
            entry.outcome = JointOutcome::Skipped {
                reason: format!("{kind} is not a joint"),
            };
            return entry;
        }
        Err(err) => {
            tracing::debug!("skipping {}: {}", entry.name, err);
            entry.outcome = JointOutcome::Failed {
                error: err.to_string(),
            };
            return entry;
        }
    }

    let bracket = match ChildBracket::open(host, joint, config.children) {
        Ok(bracket) => bracket,
        Err(err) => {
            tracing::debug!("could not isolate the children of {}: {}", entry.name, err);
            entry.outcome = JointOutcome::Failed {
                error: err.to_string(),
            };
            return entry;
        }
    };
    tracker.begin_joint(joint, bracket.parent());

    let result = solve_joint(host, &bracket, axes, config, tracker);
    entry.unrestored_children = bracket.close(host);

    entry.outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!("failed to orient {}: {}", entry.name, err);
            JointOutcome::Failed {
                error: err.to_string(),
            }
        }
    };
    entry
}

fn solve_joint<H: SceneHost + ?Sized>(
    host: &mut H,
    bracket: &ChildBracket,
    axes: &AimAxes,
    config: &OrientConfig,
    tracker: &mut ContinuityTracker,
) -> JointResult<JointOutcome> {
    let joint = bracket.joint();
    let Some(target) = bracket.first_joint_child() else {
        return match bracket.parent() {
            Some(parent) => {
                inherit_parent_frame(host, joint, parent)?;
                Ok(JointOutcome::Inherited)
            }
            None => Ok(JointOutcome::Skipped {
                reason: "no joint child to aim at and no parent".to_string(),
            }),
        };
    };

    let up = choose_up(host, joint, bracket.parent(), target, config)?;
    let direction = host.world_position(target)? - host.world_position(joint)?;
    let mut rotation = look_at(direction, up.vector, config.up_direction.vec(), axes)
        .map_err(|err| match err {
            JointError::DegenerateAxes(msg) => JointError::DegenerateAxes(format!(
                "{} -> {}: {msg}",
                host.label(joint),
                host.label(target)
            )),
            other => other,
        })?;

    let flipped = tracker.observe(up.vector);
    if flipped {
        rotation = (rotation * DQuat::from_axis_angle(axes.aim, PI)).normalize();
    }

    host.set_world_rotation(joint, rotation)?;
    host.freeze_rotation(joint)?;

    Ok(JointOutcome::Solved {
        up: up.vector,
        up_source: up.source,
        flipped,
    })
}

/// Give `joint` the world rotation of `parent` and bake it into the orient.
pub(crate) fn inherit_parent_frame<H: SceneHost + ?Sized>(
    host: &mut H,
    joint: NodeId,
    parent: NodeId,
) -> JointResult<()> {
    let rotation = host.world_rotation(parent)?;
    host.set_world_rotation(joint, rotation)?;
    host.freeze_rotation(joint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use jointkit_core::Axis;
    use jointkit_scene::{ChainBuilder, Node, Scene};

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .line("j", 2, DVec3::ZERO, DVec3::X)
            .build(&mut scene)
            .unwrap();
        let request = OrientRequest::new(ids).with_config(OrientConfig {
            aim_axis: Axis::Y,
            up_axis: Axis::NEG_Y,
            ..Default::default()
        });
        assert!(orient_joints(&mut scene, &request).is_err());
    }

    #[test]
    fn test_non_joint_is_skipped() {
        let mut scene = Scene::new("rig");
        let grp = scene
            .add_node(None, Node::new(NodeKind::Transform, "grp"))
            .unwrap();
        let report = orient_joints(&mut scene, &OrientRequest::new(vec![grp])).unwrap();
        assert!(matches!(
            report.outcome(grp),
            Some(JointOutcome::Skipped { .. })
        ));
    }

    #[test]
    fn test_lone_root_is_skipped() {
        let mut scene = Scene::new("rig");
        let root = scene.add_joint(None, "root", DVec3::ZERO).unwrap();
        let report = orient_joints(&mut scene, &OrientRequest::new(vec![root])).unwrap();
        assert!(matches!(
            report.outcome(root),
            Some(JointOutcome::Skipped { .. })
        ));
    }

    #[test]
    fn test_stale_handle_fails_without_stopping() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .line("j", 3, DVec3::ZERO, DVec3::new(1.0, 0.5, 0.0))
            .build(&mut scene)
            .unwrap();
        let ghost = NodeId::new();
        let request = OrientRequest::new(vec![ids[0], ghost, ids[1], ids[2]]);
        let report = orient_joints(&mut scene, &request).unwrap();
        assert_eq!(report.joints.len(), 4);
        assert!(matches!(
            report.outcome(ghost),
            Some(JointOutcome::Failed { .. })
        ));
        assert!(matches!(
            report.outcome(ids[2]),
            Some(JointOutcome::Inherited)
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_joint_on_top_of_target_fails() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .joint("a", DVec3::ZERO)
            .joint("b", DVec3::ZERO)
            .build(&mut scene)
            .unwrap();
        let report = orient_joints(&mut scene, &OrientRequest::new(ids.clone())).unwrap();
        match report.outcome(ids[0]) {
            Some(JointOutcome::Failed { error }) => assert!(error.contains("a -> b")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
