use jointkit_core::{ChildStrategy, JointResult};
use jointkit_scene::{KindFilter, NodeId, NodeKind, Pose};

use crate::host::SceneHost;

#[derive(Debug, Clone, Copy)]
struct ChildSnapshot {
    id: NodeId,
    kind: NodeKind,
    world: Pose,
}

/// Brackets one joint's reorientation so its children stay where they are.
///
/// [`ChildBracket::open`] records the joint's parent and every direct child
/// (with its world transform) and, for [`ChildStrategy::Detach`], moves them
/// to world space. [`ChildBracket::close`] puts every child back in recorded
/// order, so the joint's child list ends up as it started.
#[derive(Debug)]
pub struct ChildBracket {
    joint: NodeId,
    parent: Option<NodeId>,
    strategy: ChildStrategy,
    children: Vec<ChildSnapshot>,
}

impl ChildBracket {
    pub fn open<H: SceneHost + ?Sized>(
        host: &mut H,
        joint: NodeId,
        strategy: ChildStrategy,
    ) -> JointResult<Self> {
        let parent = host.parent(joint)?;
        let mut children = Vec::new();
        for id in host.children(joint, KindFilter::Any)? {
            children.push(ChildSnapshot {
                id,
                kind: host.kind(id)?,
                world: host.world_pose(id)?,
            });
        }

        let mut bracket = Self {
            joint,
            parent,
            strategy,
            children,
        };

        if strategy == ChildStrategy::Detach {
            for i in 0..bracket.children.len() {
                let child = bracket.children[i].id;
                if let Err(err) = host.reparent(child, None) {
                    // Undo the children already moved before giving up.
                    bracket.children.truncate(i);
                    bracket.close(host);
                    return Err(err);
                }
            }
        }

        Ok(bracket)
    }

    pub fn joint(&self) -> NodeId {
        self.joint
    }

    /// The joint's parent at the time the bracket was opened.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// First joint-kind child, in original order.
    pub fn first_joint_child(&self) -> Option<NodeId> {
        self.children
            .iter()
            .find(|c| c.kind == NodeKind::Joint)
            .map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Restore every recorded child. Failures are logged and skipped; the
    /// children that could not be restored are returned.
    pub fn close<H: SceneHost + ?Sized>(self, host: &mut H) -> Vec<NodeId> {
        let mut unrestored = Vec::new();
        for child in &self.children {
            let result = match self.strategy {
                ChildStrategy::Compensate => host.set_world_pose(child.id, child.world),
                ChildStrategy::Detach => host
                    .reparent(child.id, Some(self.joint))
                    .map(|_| ()),
            };
            if let Err(err) = result {
                tracing::debug!(
                    "could not restore {} under {}: {}",
                    host.label(child.id),
                    host.label(self.joint),
                    err
                );
                unrestored.push(child.id);
            }
        }
        unrestored
    }
}
