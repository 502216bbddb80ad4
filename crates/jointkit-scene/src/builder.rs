use glam::DVec3;

use jointkit_core::JointResult;

use crate::node::NodeId;
use crate::scene::Scene;

/// A builder for joint chains placed by world position.
/// Useful for tests, benchmarks, and sample rigs.
pub struct ChainBuilder {
    parent: Option<NodeId>,
    joints: Vec<(String, DVec3)>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            parent: None,
            joints: Vec::new(),
        }
    }

    /// Hang the chain under an existing node instead of the scene root.
    pub fn under(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Append a joint at a world-space position.
    pub fn joint(mut self, name: impl Into<String>, world_position: DVec3) -> Self {
        self.joints.push((name.into(), world_position));
        self
    }

    /// Append `count` joints along a straight line from `start`, `step` apart.
    pub fn line(mut self, prefix: &str, count: usize, start: DVec3, step: DVec3) -> Self {
        for i in 0..count {
            self.joints
                .push((format!("{prefix}{i}"), start + step * i as f64));
        }
        self
    }

    /// Insert the joints, each parented to the previous one.
    pub fn build(self, scene: &mut Scene) -> JointResult<Vec<NodeId>> {
        let mut ids = Vec::with_capacity(self.joints.len());
        let mut parent = self.parent;
        for (name, position) in self.joints {
            let id = scene.add_joint(parent, name, position)?;
            ids.push(id);
            parent = Some(id);
        }
        Ok(ids)
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
