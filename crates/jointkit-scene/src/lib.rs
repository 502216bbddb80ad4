//! # jointkit-scene
//!
//! An in-memory scene graph of joints and transforms. Nodes are addressed by
//! stable [`NodeId`] handles, so reparenting never invalidates a reference.
//!
//! Every node carries the channels a rigging tool edits: translation, the
//! static joint orient, the animatable rotation, and the rotate axis. World
//! transforms are derived from the parent chain on demand.

pub mod builder;
pub mod node;
pub mod scene;
pub mod validate;

pub use builder::ChainBuilder;
pub use node::{KindFilter, Node, NodeId, NodeKind, Pose};
pub use scene::Scene;
