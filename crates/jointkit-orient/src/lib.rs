//! # jointkit-orient
//!
//! The joint-chain orientation solver. Given an ordered list of joints, an
//! aim axis, an up axis and an up-direction hint, it rebuilds each joint's
//! orient channel so the aim axis points down the chain, while every other
//! node keeps its world transform.
//!
//! The solver talks to the scene only through [`SceneHost`], which is
//! implemented for the in-memory [`jointkit_scene::Scene`].
//!
//! ```
//! use glam::DVec3;
//! use jointkit_orient::{orient_joints, OrientRequest};
//! use jointkit_scene::{ChainBuilder, Scene};
//!
//! let mut scene = Scene::new("arm");
//! let joints = ChainBuilder::new()
//!     .joint("shoulder", DVec3::ZERO)
//!     .joint("elbow", DVec3::new(2.0, 0.0, -0.5))
//!     .joint("wrist", DVec3::new(4.0, 0.0, 0.0))
//!     .build(&mut scene)
//!     .unwrap();
//!
//! let report = orient_joints(&mut scene, &OrientRequest::new(joints)).unwrap();
//! assert!(report.is_clean());
//! ```

pub mod aim;
pub mod continuity;
pub mod hierarchy;
pub mod host;
pub mod report;
pub mod reset;
pub mod selection;
pub mod solver;
pub mod up;

pub use aim::{look_at, AimAxes};
pub use continuity::ContinuityTracker;
pub use hierarchy::ChildBracket;
pub use host::SceneHost;
pub use report::{JointOutcome, JointReport, OrientReport};
pub use reset::{copy_parent_orients, reset_orients};
pub use selection::SelectionScope;
pub use solver::{orient_joints, OrientRequest};
pub use up::{UpChoice, UpSource};
