//! # jointkit-core
//!
//! Core types and primitives for the jointkit rigging tools.
//! This crate contains foundational types shared across all jointkit crates:
//! vector math, axis parsing, solver configuration, and error types.

pub mod config;
pub mod error;
pub mod math;

pub use config::{ChildStrategy, ContinuityScope, OrientConfig};
pub use error::{JointError, JointResult};
pub use math::{cross, dot, normalize, Axis};
