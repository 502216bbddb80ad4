use std::collections::HashMap;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use jointkit_core::{JointError, JointResult};

use crate::node::{KindFilter, Node, NodeId, NodeKind, Pose};

/// On-disk shape of a scene: nodes in insertion order plus the selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SceneData {
    #[serde(default)]
    name: String,
    nodes: Vec<Node>,
    #[serde(default)]
    selection: Vec<NodeId>,
}

/// A scene graph of joints, transforms and shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SceneData", into = "SceneData")]
pub struct Scene {
    /// Scene name, informational only.
    pub name: String,
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    selection: Vec<NodeId>,
}

impl From<SceneData> for Scene {
    fn from(data: SceneData) -> Self {
        let mut scene = Scene {
            name: data.name,
            nodes: data.nodes,
            index: HashMap::new(),
            selection: data.selection,
        };
        scene.rebuild_index();
        scene
    }
}

impl From<Scene> for SceneData {
    fn from(scene: Scene) -> Self {
        SceneData {
            name: scene.name,
            nodes: scene.nodes,
            selection: scene.selection,
        }
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> JointResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> JointResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from_file(path: &std::path::Path) -> JointResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> JointResult<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Look up a node, failing with [`JointError::NodeNotFound`] for stale handles.
    pub fn node(&self, id: NodeId) -> JointResult<&Node> {
        self.get(id).ok_or_else(|| JointError::not_found(id))
    }

    fn node_mut(&mut self, id: NodeId) -> JointResult<&mut Node> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(JointError::not_found(id)),
        }
    }

    /// First node with the given name, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Name of a node for log messages; falls back to the handle.
    pub fn label(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(node) if !node.name.is_empty() => node.name.clone(),
            _ => id.to_string(),
        }
    }

    /// Nodes without a parent, in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Insert `node` under `parent` (or as a root). The node keeps its local
    /// channels, so its world transform follows the new parent.
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: Node) -> JointResult<NodeId> {
        if self.contains(node.id) {
            return Err(JointError::InvalidArgument(format!(
                "node {} already exists",
                node.id
            )));
        }
        if let Some(p) = parent {
            self.node(p)?;
        }
        let id = node.id;
        node.parent = parent;
        node.children.clear();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        if let Some(p) = parent {
            self.node_mut(p)?.children.push(id);
        }
        Ok(id)
    }

    /// Insert a joint at a world-space position with a world-aligned frame.
    pub fn add_joint(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        world_position: DVec3,
    ) -> JointResult<NodeId> {
        let id = self.add_node(parent, Node::joint(name))?;
        self.set_world_pose(id, Pose::new(DQuat::IDENTITY, world_position))?;
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> JointResult<()> {
        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed)?;
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        tracing::debug!("removing {} node(s) under {}", doomed.len(), self.label(id));
        self.nodes.retain(|n| !doomed.contains(&n.id));
        self.selection.retain(|s| !doomed.contains(s));
        self.rebuild_index();
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> JointResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Direct children of `id` matching `filter`, in order.
    pub fn children(&self, id: NodeId, filter: KindFilter) -> JointResult<Vec<NodeId>> {
        let node = self.node(id)?;
        let mut out = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            if filter.matches(self.node(child)?.kind) {
                out.push(child);
            }
        }
        Ok(out)
    }

    pub fn kind(&self, id: NodeId) -> JointResult<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    /// True if `ancestor` appears on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> JointResult<bool> {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(n) = current {
            if n == ancestor {
                return Ok(true);
            }
            steps += 1;
            if steps > self.nodes.len() {
                return Err(JointError::Validation(format!(
                    "parent chain of {} does not terminate",
                    self.label(id)
                )));
            }
            current = self.node(n)?.parent;
        }
        Ok(false)
    }

    /// World pose of a node, composed from the root down.
    pub fn world_pose(&self, id: NodeId) -> JointResult<Pose> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(n) = current {
            if chain.len() > self.nodes.len() {
                return Err(JointError::Validation(format!(
                    "parent chain of {} does not terminate",
                    self.label(id)
                )));
            }
            let node = self.node(n)?;
            chain.push(node.local_pose());
            current = node.parent;
        }
        Ok(chain
            .iter()
            .rev()
            .fold(Pose::IDENTITY, |world, local| world.then(local)))
    }

    pub fn world_position(&self, id: NodeId) -> JointResult<DVec3> {
        Ok(self.world_pose(id)?.translation)
    }

    pub fn world_rotation(&self, id: NodeId) -> JointResult<DQuat> {
        Ok(self.world_pose(id)?.rotation)
    }

    fn parent_world_pose(&self, id: NodeId) -> JointResult<Pose> {
        match self.node(id)?.parent {
            Some(parent) => self.world_pose(parent),
            None => Ok(Pose::IDENTITY),
        }
    }

    /// Set the local transform, routing rotation into the channel that
    /// [`Node::set_local_pose`] picks for the node kind.
    pub fn set_local_pose(&mut self, id: NodeId, local: Pose) -> JointResult<()> {
        self.node_mut(id)?.set_local_pose(local);
        Ok(())
    }

    /// Move a node so that its world transform equals `world`.
    pub fn set_world_pose(&mut self, id: NodeId, world: Pose) -> JointResult<()> {
        let parent = self.parent_world_pose(id)?;
        self.set_local_pose(id, parent.inverse().then(&world))
    }

    /// Solve the animatable rotation channel so the node's world rotation
    /// equals `rotation`. Orient and rotate axis are left untouched.
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: DQuat) -> JointResult<()> {
        let parent = self.parent_world_pose(id)?;
        let node = self.node_mut(id)?;
        let local = parent.rotation.inverse() * rotation;
        node.rotation =
            (node.joint_orient.inverse() * local * node.rotate_axis.inverse()).normalize();
        Ok(())
    }

    /// Bake rotation and rotate axis into the orient channel, leaving both at
    /// identity. The local transform is unchanged.
    pub fn freeze_rotation(&mut self, id: NodeId) -> JointResult<()> {
        let node = self.node_mut(id)?;
        if node.kind != NodeKind::Joint {
            return Err(JointError::wrong_kind(&node.name, NodeKind::Joint, node.kind));
        }
        node.joint_orient = node.local_rotation();
        node.rotation = DQuat::IDENTITY;
        node.rotate_axis = DQuat::IDENTITY;
        Ok(())
    }

    /// Zero orient, rotation and rotate axis. Translation is kept.
    pub fn reset_channels(&mut self, id: NodeId) -> JointResult<()> {
        let node = self.node_mut(id)?;
        node.joint_orient = DQuat::IDENTITY;
        node.rotation = DQuat::IDENTITY;
        node.rotate_axis = DQuat::IDENTITY;
        Ok(())
    }

    /// Move `id` under `new_parent` (or to world) keeping its world transform.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> JointResult<NodeId> {
        let world = self.world_pose(id)?;
        if let Some(p) = new_parent {
            if self.is_ancestor(id, p)? {
                return Err(JointError::Cycle {
                    node: self.label(id),
                    parent: self.label(p),
                });
            }
        }
        if let Some(old) = self.node(id)?.parent {
            self.node_mut(old)?.children.retain(|c| *c != id);
        }
        if let Some(p) = new_parent {
            self.node_mut(p)?.children.push(id);
        }
        self.node_mut(id)?.parent = new_parent;
        self.set_world_pose(id, world)?;
        tracing::debug!(
            "reparented {} under {}",
            self.label(id),
            new_parent.map_or_else(|| "world".to_string(), |p| self.label(p))
        );
        Ok(id)
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Replace the selection. Stale handles are rejected and leave the
    /// selection untouched.
    pub fn set_selection(&mut self, ids: &[NodeId]) -> JointResult<()> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(JointError::not_found(missing));
        }
        self.selection = ids.to_vec();
        Ok(())
    }

    /// All nodes below `id` (inclusive), depth first.
    pub fn descendants(&self, id: NodeId) -> JointResult<Vec<NodeId>> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out)?;
        Ok(out)
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) -> JointResult<()> {
        if out.contains(&id) {
            return Err(JointError::Validation(format!(
                "cycle through {}",
                self.label(id)
            )));
        }
        out.push(id);
        for &child in &self.node(id)?.children {
            self.collect_subtree(child, out)?;
        }
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    fn chain(scene: &mut Scene) -> (NodeId, NodeId, NodeId) {
        let a = scene.add_joint(None, "a", DVec3::ZERO).unwrap();
        let b = scene.add_joint(Some(a), "b", DVec3::new(1.0, 0.0, 0.0)).unwrap();
        let c = scene.add_joint(Some(b), "c", DVec3::new(2.0, 0.0, 0.0)).unwrap();
        (a, b, c)
    }

    #[test]
    fn test_add_and_query() {
        let mut scene = Scene::new("rig");
        let (a, b, c) = chain(&mut scene);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.parent(b).unwrap(), Some(a));
        assert_eq!(scene.children(a, KindFilter::Joints).unwrap(), vec![b]);
        assert_eq!(scene.roots(), vec![a]);
        assert!(close(scene.world_position(c).unwrap(), DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(scene.find_by_name("c"), Some(c));
    }

    #[test]
    fn test_children_filter() {
        let mut scene = Scene::new("rig");
        let (a, b, _) = chain(&mut scene);
        let grp = scene
            .add_node(Some(a), Node::new(NodeKind::Transform, "grp"))
            .unwrap();
        let loc = scene
            .add_node(Some(a), Node::new(NodeKind::Shape, "loc"))
            .unwrap();
        assert_eq!(scene.children(a, KindFilter::Joints).unwrap(), vec![b]);
        assert_eq!(scene.children(a, KindFilter::Any).unwrap(), vec![b, grp, loc]);
    }

    #[test]
    fn test_world_transform_follows_parent_rotation() {
        let mut scene = Scene::new("rig");
        let (a, _, c) = chain(&mut scene);
        scene
            .set_world_rotation(a, DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2))
            .unwrap();
        assert!(close(scene.world_position(c).unwrap(), DVec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_reparent_preserves_world() {
        let mut scene = Scene::new("rig");
        let (a, b, c) = chain(&mut scene);
        scene
            .set_world_rotation(b, DQuat::from_rotation_y(0.6))
            .unwrap();
        let before = scene.world_pose(c).unwrap();

        scene.reparent(c, None).unwrap();
        let detached = scene.world_pose(c).unwrap();
        assert!(close(detached.translation, before.translation));
        assert!(detached.rotation.angle_between(before.rotation) < 1e-9);

        scene.reparent(c, Some(a)).unwrap();
        let after = scene.world_pose(c).unwrap();
        assert!(close(after.translation, before.translation));
        assert!(after.rotation.angle_between(before.rotation) < 1e-9);
        assert_eq!(scene.children(a, KindFilter::Any).unwrap(), vec![b, c]);
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let mut scene = Scene::new("rig");
        let (a, _, c) = chain(&mut scene);
        let err = scene.reparent(a, Some(c)).unwrap_err();
        assert!(matches!(err, JointError::Cycle { .. }));
        assert_eq!(scene.parent(a).unwrap(), None);
    }

    #[test]
    fn test_set_world_rotation_solves_rotation_channel() {
        let mut scene = Scene::new("rig");
        let (a, b, _) = chain(&mut scene);
        scene
            .set_world_rotation(a, DQuat::from_rotation_x(0.3))
            .unwrap();
        let target = DQuat::from_rotation_y(1.1);
        scene.set_world_rotation(b, target).unwrap();
        assert!(scene.world_rotation(b).unwrap().angle_between(target) < 1e-9);
        assert_eq!(scene.node(b).unwrap().joint_orient, DQuat::IDENTITY);
    }

    #[test]
    fn test_freeze_moves_rotation_into_orient() {
        let mut scene = Scene::new("rig");
        let (a, _, c) = chain(&mut scene);
        scene
            .set_world_rotation(a, DQuat::from_rotation_z(0.4))
            .unwrap();
        let before = scene.world_pose(c).unwrap();
        scene.freeze_rotation(a).unwrap();
        let node = scene.node(a).unwrap();
        assert_eq!(node.rotation, DQuat::IDENTITY);
        assert!(node.joint_orient.angle_between(DQuat::from_rotation_z(0.4)) < 1e-9);
        assert!(close(scene.world_position(c).unwrap(), before.translation));
    }

    #[test]
    fn test_freeze_rejects_non_joint() {
        let mut scene = Scene::new("rig");
        let grp = scene
            .add_node(None, Node::new(NodeKind::Transform, "grp"))
            .unwrap();
        assert!(matches!(
            scene.freeze_rotation(grp),
            Err(JointError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_remove_subtree_and_selection() {
        let mut scene = Scene::new("rig");
        let (a, b, c) = chain(&mut scene);
        scene.set_selection(&[a, c]).unwrap();
        scene.remove(b).unwrap();
        assert_eq!(scene.len(), 1);
        assert!(!scene.contains(c));
        assert_eq!(scene.selection(), &[a]);
        assert!(scene.children(a, KindFilter::Any).unwrap().is_empty());
        assert!(matches!(scene.node(b), Err(JointError::NodeNotFound(_))));
    }

    #[test]
    fn test_set_selection_rejects_stale() {
        let mut scene = Scene::new("rig");
        let (a, _, _) = chain(&mut scene);
        scene.set_selection(&[a]).unwrap();
        assert!(scene.set_selection(&[NodeId::new()]).is_err());
        assert_eq!(scene.selection(), &[a]);
    }

    #[test]
    fn test_json_roundtrip_keeps_hierarchy() {
        let mut scene = Scene::new("rig");
        let (a, b, c) = chain(&mut scene);
        scene.set_selection(&[b]).unwrap();
        let json = scene.to_json_string().unwrap();
        let loaded = Scene::from_json_str(&json).unwrap();
        assert_eq!(loaded.name, "rig");
        assert_eq!(loaded.children(a, KindFilter::Joints).unwrap(), vec![b]);
        assert_eq!(loaded.selection(), &[b]);
        assert!(close(loaded.world_position(c).unwrap(), DVec3::new(2.0, 0.0, 0.0)));
    }
}
