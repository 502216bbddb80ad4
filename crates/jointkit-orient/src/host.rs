use glam::{DQuat, DVec3};

use jointkit_core::JointResult;
use jointkit_scene::{KindFilter, NodeId, NodeKind, Pose, Scene};

/// Everything the solver needs from a scene graph.
///
/// Implementations must keep world transforms intact across [`reparent`]
/// and must leave the local transform unchanged in [`freeze_rotation`].
///
/// [`reparent`]: SceneHost::reparent
/// [`freeze_rotation`]: SceneHost::freeze_rotation
pub trait SceneHost {
    /// Human-readable name for logs and reports.
    fn label(&self, node: NodeId) -> String;

    fn kind(&self, node: NodeId) -> JointResult<NodeKind>;

    fn parent(&self, node: NodeId) -> JointResult<Option<NodeId>>;

    /// Direct children matching `filter`, in hierarchy order.
    fn children(&self, node: NodeId, filter: KindFilter) -> JointResult<Vec<NodeId>>;

    fn world_pose(&self, node: NodeId) -> JointResult<Pose>;

    fn world_position(&self, node: NodeId) -> JointResult<DVec3> {
        Ok(self.world_pose(node)?.translation)
    }

    fn world_rotation(&self, node: NodeId) -> JointResult<DQuat> {
        Ok(self.world_pose(node)?.rotation)
    }

    /// Move `node` under `new_parent` (`None` for world) without moving it.
    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> JointResult<NodeId>;

    /// Set the node's world transform by adjusting its local channels.
    fn set_world_pose(&mut self, node: NodeId, pose: Pose) -> JointResult<()>;

    /// Drive the animatable rotation so the world rotation equals `rotation`.
    fn set_world_rotation(&mut self, node: NodeId, rotation: DQuat) -> JointResult<()>;

    /// Bake rotation into the orient channel and zero the rotation and
    /// rotate-axis channels.
    fn freeze_rotation(&mut self, node: NodeId) -> JointResult<()>;

    /// Set orient, rotation and rotate axis to identity.
    fn reset_channels(&mut self, node: NodeId) -> JointResult<()>;

    fn selection(&self) -> JointResult<Vec<NodeId>>;

    fn set_selection(&mut self, nodes: &[NodeId]) -> JointResult<()>;
}

impl SceneHost for Scene {
    fn label(&self, node: NodeId) -> String {
        Scene::label(self, node)
    }

    fn kind(&self, node: NodeId) -> JointResult<NodeKind> {
        Scene::kind(self, node)
    }

    fn parent(&self, node: NodeId) -> JointResult<Option<NodeId>> {
        Scene::parent(self, node)
    }

    fn children(&self, node: NodeId, filter: KindFilter) -> JointResult<Vec<NodeId>> {
        Scene::children(self, node, filter)
    }

    fn world_pose(&self, node: NodeId) -> JointResult<Pose> {
        Scene::world_pose(self, node)
    }

    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> JointResult<NodeId> {
        Scene::reparent(self, node, new_parent)
    }

    fn set_world_pose(&mut self, node: NodeId, pose: Pose) -> JointResult<()> {
        Scene::set_world_pose(self, node, pose)
    }

    fn set_world_rotation(&mut self, node: NodeId, rotation: DQuat) -> JointResult<()> {
        Scene::set_world_rotation(self, node, rotation)
    }

    fn freeze_rotation(&mut self, node: NodeId) -> JointResult<()> {
        Scene::freeze_rotation(self, node)
    }

    fn reset_channels(&mut self, node: NodeId) -> JointResult<()> {
        Scene::reset_channels(self, node)
    }

    fn selection(&self) -> JointResult<Vec<NodeId>> {
        Ok(Scene::selection(self).to_vec())
    }

    fn set_selection(&mut self, nodes: &[NodeId]) -> JointResult<()> {
        Scene::set_selection(self, nodes)
    }
}
