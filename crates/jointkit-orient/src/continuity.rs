use glam::DVec3;

use jointkit_core::math::{dot, normalize};
use jointkit_core::ContinuityScope;
use jointkit_scene::NodeId;

/// Running up direction used to catch 180° flips between consecutive joints.
///
/// Each aimed joint reports its up vector through [`observe`]. If it points
/// away from the running direction (dot ≤ 0), the joint must be turned half
/// way around its aim axis, and the running direction follows the corrected
/// up rather than the raw one.
///
/// [`observe`]: ContinuityTracker::observe
#[derive(Debug, Clone)]
pub struct ContinuityTracker {
    scope: ContinuityScope,
    starting_up: DVec3,
    primed: bool,
    previous_joint: Option<NodeId>,
}

impl ContinuityTracker {
    pub fn new(scope: ContinuityScope) -> Self {
        Self {
            scope,
            starting_up: DVec3::ZERO,
            primed: false,
            previous_joint: None,
        }
    }

    /// Announce the next joint in input order. Under
    /// [`ContinuityScope::PerChain`] this restarts the tracker when the joint
    /// does not continue the previous one.
    pub fn begin_joint(&mut self, joint: NodeId, parent: Option<NodeId>) {
        if self.scope == ContinuityScope::PerChain
            && self.previous_joint.is_some()
            && parent != self.previous_joint
        {
            self.reset();
        }
        self.previous_joint = Some(joint);
    }

    /// Feed the up vector just chosen for the current joint. Returns `true`
    /// when the joint's orientation has to be flipped.
    pub fn observe(&mut self, up: DVec3) -> bool {
        let current = normalize(up);
        let flip = self.primed && dot(current, self.starting_up) <= 0.0;
        self.starting_up = if flip { -current } else { current };
        self.primed = true;
        flip
    }

    pub fn starting_up(&self) -> DVec3 {
        self.starting_up
    }

    pub fn reset(&mut self) {
        self.starting_up = DVec3::ZERO;
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_never_flips() {
        let mut tracker = ContinuityTracker::new(ContinuityScope::Global);
        assert!(!tracker.observe(DVec3::NEG_Y));
        assert_eq!(tracker.starting_up(), DVec3::NEG_Y);
    }

    #[test]
    fn test_opposite_sample_flips() {
        let mut tracker = ContinuityTracker::new(ContinuityScope::Global);
        tracker.observe(DVec3::Z);
        assert!(tracker.observe(DVec3::new(0.0, 0.0, -3.0)));
        // Running direction is the corrected up, so agreeing samples pass.
        assert_eq!(tracker.starting_up(), DVec3::Z);
        assert!(!tracker.observe(DVec3::new(0.1, 0.0, 1.0)));
    }

    #[test]
    fn test_perpendicular_counts_as_flip() {
        let mut tracker = ContinuityTracker::new(ContinuityScope::Global);
        tracker.observe(DVec3::Y);
        assert!(tracker.observe(DVec3::X));
    }

    #[test]
    fn test_global_scope_carries_across_chains() {
        let mut tracker = ContinuityTracker::new(ContinuityScope::Global);
        let (a, b) = (NodeId::new(), NodeId::new());
        tracker.begin_joint(a, None);
        tracker.observe(DVec3::Z);
        tracker.begin_joint(b, None);
        assert!(tracker.observe(DVec3::NEG_Z));
    }

    #[test]
    fn test_per_chain_scope_resets_on_new_chain() {
        let mut tracker = ContinuityTracker::new(ContinuityScope::PerChain);
        let (a, b, c) = (NodeId::new(), NodeId::new(), NodeId::new());
        tracker.begin_joint(a, None);
        tracker.observe(DVec3::Z);
        tracker.begin_joint(b, Some(a));
        assert!(tracker.observe(DVec3::NEG_Z));
        tracker.begin_joint(c, None);
        assert!(!tracker.observe(DVec3::NEG_Z));
    }
}
