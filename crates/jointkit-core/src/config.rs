use serde::{Deserialize, Serialize};

use crate::error::{JointError, JointResult};
use crate::math::Axis;

/// How far the up-vector continuity state reaches across the joint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContinuityScope {
    /// One running up vector for the whole input list, even across
    /// unrelated chains.
    #[default]
    Global,
    /// Restart whenever a joint's parent is not the previously processed joint.
    PerChain,
}

/// How a joint's children are kept in place while the joint is reoriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildStrategy {
    /// Snapshot world transforms, then assign compensating local transforms.
    #[default]
    Compensate,
    /// Reparent children to world space and back around the solve.
    Detach,
}

/// Settings for one orientation run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrientConfig {
    /// Local axis that points at the aim target.
    pub aim_axis: Axis,
    /// Local axis that follows the up vector.
    pub up_axis: Axis,
    /// World-space up hint; fallback whenever detection fails.
    pub up_direction: Axis,
    /// Derive the up vector from neighbouring joint positions.
    pub auto_detect_up: bool,
    pub continuity: ContinuityScope,
    pub children: ChildStrategy,
    /// Absolute distance under which a joint sits on top of its parent.
    pub coincidence_tolerance: f64,
}

impl Default for OrientConfig {
    fn default() -> Self {
        Self {
            aim_axis: Axis::X,
            up_axis: Axis::Y,
            up_direction: Axis::Y,
            auto_detect_up: false,
            continuity: ContinuityScope::Global,
            children: ChildStrategy::Compensate,
            coincidence_tolerance: 1e-4,
        }
    }
}

impl OrientConfig {
    pub fn load_from_file(path: &std::path::Path) -> JointResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: OrientConfig =
            toml::from_str(&contents).map_err(|e| JointError::config(e.to_string(), path))?;
        config
            .validate()
            .map_err(|e| JointError::config(e.to_string(), path))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> JointResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| JointError::config(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Check that the axes can form a frame.
    pub fn validate(&self) -> JointResult<()> {
        let aim = self.aim_axis.vec();
        let up = self.up_axis.vec();
        if crate::math::cross(aim, up) == glam::DVec3::ZERO {
            return Err(JointError::DegenerateAxes(format!(
                "aim axis {} and up axis {} are parallel",
                self.aim_axis, self.up_axis
            )));
        }
        if !(self.coincidence_tolerance.is_finite() && self.coincidence_tolerance >= 0.0) {
            return Err(JointError::InvalidArgument(format!(
                "coincidence tolerance must be a non-negative number, got {}",
                self.coincidence_tolerance
            )));
        }
        Ok(())
    }
}
