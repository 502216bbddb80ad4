use std::collections::HashSet;

use jointkit_core::JointError;

use crate::scene::Scene;

const UNIT_TOLERANCE: f64 = 1e-6;

/// Validate a scene for structural correctness.
pub fn validate_scene(scene: &Scene) -> Result<(), Vec<JointError>> {
    let mut errors = Vec::new();

    // Duplicate handles
    let mut ids = HashSet::new();
    for node in scene.iter() {
        if !ids.insert(node.id) {
            errors.push(JointError::Validation(format!(
                "duplicate node id: {}",
                node.id
            )));
        }
    }

    for node in scene.iter() {
        let label = scene.label(node.id);

        // Parent link must exist and list this node as a child.
        if let Some(parent) = node.parent {
            match scene.get(parent) {
                None => errors.push(JointError::Validation(format!(
                    "node '{label}' references missing parent {parent}"
                ))),
                Some(p) if !p.children.contains(&node.id) => {
                    errors.push(JointError::Validation(format!(
                        "node '{label}' is not listed among the children of '{}'",
                        scene.label(parent)
                    )))
                }
                Some(_) => {}
            }
        }

        // Child links must exist and point back.
        for &child in &node.children {
            match scene.get(child) {
                None => errors.push(JointError::Validation(format!(
                    "node '{label}' references missing child {child}"
                ))),
                Some(c) if c.parent != Some(node.id) => {
                    errors.push(JointError::Validation(format!(
                        "child '{}' of '{label}' names a different parent",
                        scene.label(child)
                    )))
                }
                Some(_) => {}
            }
        }

        if let Err(err) = scene.world_pose(node.id) {
            errors.push(err);
        }

        for (channel, q) in [
            ("joint orient", node.joint_orient),
            ("rotation", node.rotation),
            ("rotate axis", node.rotate_axis),
        ] {
            if !q.is_finite() || (q.length() - 1.0).abs() > UNIT_TOLERANCE {
                errors.push(JointError::Validation(format!(
                    "node '{label}' has a non-unit {channel} quaternion"
                )));
            }
        }
        if !node.translation.is_finite() {
            errors.push(JointError::Validation(format!(
                "node '{label}' has a non-finite translation"
            )));
        }
    }

    if let Some(missing) = scene.selection().iter().find(|id| !scene.contains(**id)) {
        errors.push(JointError::Validation(format!(
            "selection references missing node {missing}"
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
