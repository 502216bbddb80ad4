use glam::DVec3;
use serde::{Deserialize, Serialize};

use jointkit_core::math::{cross, is_usable, normalize};
use jointkit_core::{JointResult, OrientConfig};
use jointkit_scene::{KindFilter, NodeId};

use crate::host::SceneHost;

/// Where a joint's up vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpSource {
    /// The configured up direction.
    Default,
    /// Joint, aim target and the target's first joint child.
    Forward,
    /// Parent, joint and aim target.
    Backward,
}

/// A unit up vector and its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpChoice {
    pub vector: DVec3,
    pub source: UpSource,
}

impl UpChoice {
    fn fallback(config: &OrientConfig) -> Self {
        Self {
            vector: config.up_direction.vec(),
            source: UpSource::Default,
        }
    }
}

/// Pick the up vector for `joint` aiming at `target`.
///
/// With auto-detection, a joint sitting on its parent (or without one)
/// looks forward through `target`'s first joint child; otherwise it looks
/// back through its parent. Degenerate windows fall back to the configured
/// up direction.
pub fn choose_up<H: SceneHost + ?Sized>(
    host: &H,
    joint: NodeId,
    parent: Option<NodeId>,
    target: NodeId,
    config: &OrientConfig,
) -> JointResult<UpChoice> {
    if !config.auto_detect_up {
        return Ok(UpChoice::fallback(config));
    }

    let position = host.world_position(joint)?;
    let target_position = host.world_position(target)?;
    let parent_position = match parent {
        Some(p) => Some(host.world_position(p)?),
        None => None,
    };
    let on_parent = match parent_position {
        Some(p) => p.distance(position) <= config.coincidence_tolerance,
        None => true,
    };

    let (candidate, source) = match parent_position {
        Some(parent_position) if !on_parent => (
            cross(position - parent_position, target_position - position),
            UpSource::Backward,
        ),
        _ => {
            let next = host.children(target, KindFilter::Joints)?.first().copied();
            let window = match next {
                Some(next) => cross(
                    target_position - position,
                    host.world_position(next)? - target_position,
                ),
                None => DVec3::ZERO,
            };
            (window, UpSource::Forward)
        }
    };

    if !is_usable(candidate) {
        tracing::debug!(
            "no usable {:?} up vector for {}, using default {}",
            source,
            host.label(joint),
            config.up_direction
        );
        return Ok(UpChoice::fallback(config));
    }
    Ok(UpChoice {
        vector: normalize(candidate),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointkit_core::Axis;
    use jointkit_scene::{ChainBuilder, Scene};

    fn auto() -> OrientConfig {
        OrientConfig {
            auto_detect_up: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_without_detection_uses_default() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .line("j", 3, DVec3::ZERO, DVec3::X)
            .build(&mut scene)
            .unwrap();
        let config = OrientConfig {
            up_direction: Axis::Z,
            ..Default::default()
        };
        let up = choose_up(&scene, ids[0], None, ids[1], &config).unwrap();
        assert_eq!(up.vector, DVec3::Z);
        assert_eq!(up.source, UpSource::Default);
    }

    #[test]
    fn test_backward_window() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .joint("a", DVec3::ZERO)
            .joint("b", DVec3::new(1.0, 1.0, 0.0))
            .joint("c", DVec3::new(2.0, 0.0, 0.0))
            .build(&mut scene)
            .unwrap();
        let up = choose_up(&scene, ids[1], Some(ids[0]), ids[2], &auto()).unwrap();
        assert_eq!(up.source, UpSource::Backward);
        assert!((up.vector - DVec3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn test_root_looks_forward() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .joint("a", DVec3::ZERO)
            .joint("b", DVec3::new(1.0, 1.0, 0.0))
            .joint("c", DVec3::new(2.0, 0.0, 0.0))
            .build(&mut scene)
            .unwrap();
        let up = choose_up(&scene, ids[0], None, ids[1], &auto()).unwrap();
        assert_eq!(up.source, UpSource::Forward);
        assert!((up.vector - DVec3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn test_coincident_joint_looks_forward() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .joint("a", DVec3::ZERO)
            .joint("b", DVec3::new(0.0, 0.0, 0.00001))
            .joint("c", DVec3::new(1.0, 0.0, 0.0))
            .joint("d", DVec3::new(1.0, 1.0, 0.0))
            .build(&mut scene)
            .unwrap();
        let up = choose_up(&scene, ids[1], Some(ids[0]), ids[2], &auto()).unwrap();
        assert_eq!(up.source, UpSource::Forward);
        assert!(up.vector.z > 0.99);
    }

    #[test]
    fn test_straight_chain_falls_back() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .line("j", 3, DVec3::ZERO, DVec3::X)
            .build(&mut scene)
            .unwrap();
        let up = choose_up(&scene, ids[1], Some(ids[0]), ids[2], &auto()).unwrap();
        assert_eq!(up.source, UpSource::Default);
        assert_eq!(up.vector, DVec3::Y);
    }

    #[test]
    fn test_forward_without_next_joint_falls_back() {
        let mut scene = Scene::new("rig");
        let ids = ChainBuilder::new()
            .line("j", 2, DVec3::ZERO, DVec3::X)
            .build(&mut scene)
            .unwrap();
        let up = choose_up(&scene, ids[0], None, ids[1], &auto()).unwrap();
        assert_eq!(up.source, UpSource::Default);
    }
}
