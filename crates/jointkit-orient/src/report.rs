use glam::DVec3;
use serde::{Deserialize, Serialize};

use jointkit_scene::NodeId;

use crate::up::UpSource;

/// What happened to one joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum JointOutcome {
    /// Aimed at its first joint child.
    Solved {
        up: DVec3,
        up_source: UpSource,
        /// Turned 180° about the aim axis to stay continuous with the
        /// previous joint.
        flipped: bool,
    },
    /// Took its parent's frame.
    Inherited,
    /// Orient, rotation and rotate axis cleared.
    Reset,
    Skipped { reason: String },
    Failed { error: String },
}

/// One entry per input joint, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointReport {
    pub joint: NodeId,
    pub name: String,
    #[serde(flatten)]
    pub outcome: JointOutcome,
    /// Children that could not be put back after the joint was reoriented.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrestored_children: Vec<NodeId>,
}

/// Result of a batch run over a joint list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientReport {
    pub joints: Vec<JointReport>,
    /// False when the caller's selection could not be put back.
    pub selection_restored: bool,
}

impl Default for OrientReport {
    fn default() -> Self {
        Self {
            joints: Vec::new(),
            selection_restored: true,
        }
    }
}

impl OrientReport {
    pub fn get(&self, joint: NodeId) -> Option<&JointReport> {
        self.joints.iter().find(|r| r.joint == joint)
    }

    pub fn outcome(&self, joint: NodeId) -> Option<&JointOutcome> {
        self.get(joint).map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &JointReport> {
        self.joints
            .iter()
            .filter(|r| matches!(r.outcome, JointOutcome::Failed { .. }))
    }

    pub fn flipped_count(&self) -> usize {
        self.joints
            .iter()
            .filter(|r| matches!(r.outcome, JointOutcome::Solved { flipped: true, .. }))
            .count()
    }

    /// No failures, nothing left unrestored, selection put back.
    pub fn is_clean(&self) -> bool {
        self.selection_restored
            && self.joints.iter().all(|r| {
                r.unrestored_children.is_empty()
                    && !matches!(r.outcome, JointOutcome::Failed { .. })
            })
    }

    /// One-line tally, e.g. `3 solved (1 flipped), 1 inherited, 0 failed`.
    pub fn summary(&self) -> String {
        let mut solved = 0;
        let mut inherited = 0;
        let mut reset = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for r in &self.joints {
            match r.outcome {
                JointOutcome::Solved { .. } => solved += 1,
                JointOutcome::Inherited => inherited += 1,
                JointOutcome::Reset => reset += 1,
                JointOutcome::Skipped { .. } => skipped += 1,
                JointOutcome::Failed { .. } => failed += 1,
            }
        }
        let mut parts = Vec::new();
        if solved > 0 {
            parts.push(format!("{solved} solved ({} flipped)", self.flipped_count()));
        }
        if inherited > 0 {
            parts.push(format!("{inherited} inherited"));
        }
        if reset > 0 {
            parts.push(format!("{reset} reset"));
        }
        if skipped > 0 {
            parts.push(format!("{skipped} skipped"));
        }
        parts.push(format!("{failed} failed"));
        parts.join(", ")
    }
}
