use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable handle for a node. Survives reparenting and renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A skeleton joint; the only kind that can be an aim target.
    Joint,
    /// A plain transform group.
    Transform,
    /// Anything else parented into the hierarchy (locators, curves, meshes).
    Shape,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Joint => write!(f, "joint"),
            NodeKind::Transform => write!(f, "transform"),
            NodeKind::Shape => write!(f, "shape"),
        }
    }
}

/// Restricts which children a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Any,
    Joints,
}

impl KindFilter {
    pub fn matches(self, kind: NodeKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Joints => kind == NodeKind::Joint,
        }
    }
}

/// A rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        rotation: DQuat::IDENTITY,
        translation: DVec3::ZERO,
    };

    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// `self` applied after `local`, i.e. parent · child.
    pub fn then(&self, local: &Pose) -> Pose {
        Pose {
            rotation: (self.rotation * local.rotation).normalize(),
            translation: self.translation + self.rotation * local.translation,
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation * point
    }

}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Display name. Not required to be unique.
    pub name: String,
    pub kind: NodeKind,
    /// Position in the parent's space.
    pub translation: DVec3,
    /// Static orient channel, applied before the animatable rotation.
    #[serde(default = "identity")]
    pub joint_orient: DQuat,
    /// Animatable rotation channel.
    #[serde(default = "identity")]
    pub rotation: DQuat,
    /// Rotate-axis (scale orient) channel, applied after the rotation.
    #[serde(default = "identity")]
    pub rotate_axis: DQuat,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

fn identity() -> DQuat {
    DQuat::IDENTITY
}

impl Node {
    /// Create an unparented node at the origin with identity channels.
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            translation: DVec3::ZERO,
            joint_orient: DQuat::IDENTITY,
            rotation: DQuat::IDENTITY,
            rotate_axis: DQuat::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn joint(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Joint, name)
    }

    /// Builder: set the local translation.
    pub fn with_translation(mut self, translation: DVec3) -> Self {
        self.translation = translation;
        self
    }

    /// Builder: set the joint orient channel.
    pub fn with_orient(mut self, orient: DQuat) -> Self {
        self.joint_orient = orient;
        self
    }

    /// Builder: set the animatable rotation channel.
    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set the rotate-axis channel.
    pub fn with_rotate_axis(mut self, rotate_axis: DQuat) -> Self {
        self.rotate_axis = rotate_axis;
        self
    }

    /// Combined local rotation: orient · rotation · rotate axis.
    pub fn local_rotation(&self) -> DQuat {
        (self.joint_orient * self.rotation * self.rotate_axis).normalize()
    }

    pub fn local_pose(&self) -> Pose {
        Pose::new(self.local_rotation(), self.translation)
    }

    /// Put `local` into the channels, keeping the animatable rotation and
    /// rotate axis as they are. Joints absorb the difference into their
    /// orient; other nodes into their rotation.
    pub fn set_local_pose(&mut self, local: Pose) {
        self.translation = local.translation;
        match self.kind {
            NodeKind::Joint => {
                self.joint_orient =
                    (local.rotation * (self.rotation * self.rotate_axis).inverse()).normalize();
            }
            NodeKind::Transform | NodeKind::Shape => {
                self.rotation = (self.joint_orient.inverse()
                    * local.rotation
                    * self.rotate_axis.inverse())
                .normalize();
            }
        }
    }
}
