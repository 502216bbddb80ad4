use glam::{DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::error::{JointError, JointResult};

/// Relative tolerance under which two vectors are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// Absolute length under which a vector is treated as zero.
pub const ZERO_LENGTH: f64 = 1e-12;

/// Standard 3D dot product.
pub fn dot(a: DVec3, b: DVec3) -> f64 {
    a.dot(b)
}

/// Standard 3D cross product.
///
/// Returns exactly [`DVec3::ZERO`] when either input has zero length or the
/// inputs are parallel (within [`PARALLEL_EPSILON`] of the sine between them).
/// Callers treat a zero result as "no usable up vector" and fall back.
pub fn cross(a: DVec3, b: DVec3) -> DVec3 {
    let la = a.length();
    let lb = b.length();
    if !(la > ZERO_LENGTH && lb > ZERO_LENGTH) {
        return DVec3::ZERO;
    }
    let c = a.cross(b);
    if c.length() <= PARALLEL_EPSILON * la * lb {
        return DVec3::ZERO;
    }
    c
}

/// Normalize a vector; zero (or non-finite) in, zero out.
pub fn normalize(v: DVec3) -> DVec3 {
    if !is_usable(v) {
        return DVec3::ZERO;
    }
    v / v.length()
}

/// True if the vector is finite and long enough to normalize.
pub fn is_usable(v: DVec3) -> bool {
    v.is_finite() && v.length() > ZERO_LENGTH
}

/// Read a rotation as XYZ Euler angles in degrees (x applied first).
pub fn orient_degrees(q: DQuat) -> DVec3 {
    let (z, y, x) = q.to_euler(EulerRot::ZYX);
    DVec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Build a rotation from XYZ Euler angles in degrees (x applied first).
pub fn quat_from_degrees(degrees: DVec3) -> DQuat {
    DQuat::from_euler(
        EulerRot::ZYX,
        degrees.z.to_radians(),
        degrees.y.to_radians(),
        degrees.x.to_radians(),
    )
}

/// Angle in degrees between two rotations.
pub fn angle_between_degrees(a: DQuat, b: DQuat) -> f64 {
    a.angle_between(b).to_degrees()
}

/// A unit direction in some frame, written as `x`, `-y`, `+z` or `0,1,0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Axis(DVec3);

impl Axis {
    pub const X: Axis = Axis(DVec3::X);
    pub const Y: Axis = Axis(DVec3::Y);
    pub const Z: Axis = Axis(DVec3::Z);
    pub const NEG_X: Axis = Axis(DVec3::NEG_X);
    pub const NEG_Y: Axis = Axis(DVec3::NEG_Y);
    pub const NEG_Z: Axis = Axis(DVec3::NEG_Z);

    /// Create an axis from any non-zero vector. The vector is normalized.
    pub fn new(v: DVec3) -> JointResult<Self> {
        if !is_usable(v) {
            return Err(JointError::InvalidArgument(format!(
                "axis must be a finite, non-zero vector, got {v}"
            )));
        }
        Ok(Self(normalize(v)))
    }

    /// The unit vector.
    pub fn vec(self) -> DVec3 {
        self.0
    }
}

impl From<Axis> for DVec3 {
    fn from(axis: Axis) -> Self {
        axis.0
    }
}

impl std::str::FromStr for Axis {
    type Err = JointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let named = match trimmed.as_str() {
            "x" | "+x" => Some(Axis::X),
            "y" | "+y" => Some(Axis::Y),
            "z" | "+z" => Some(Axis::Z),
            "-x" => Some(Axis::NEG_X),
            "-y" => Some(Axis::NEG_Y),
            "-z" => Some(Axis::NEG_Z),
            _ => None,
        };
        if let Some(axis) = named {
            return Ok(axis);
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(JointError::InvalidArgument(format!(
                "expected an axis name or 'x,y,z' components, got '{s}'"
            )));
        }
        let mut components = [0.0; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse::<f64>().map_err(|_| {
                JointError::InvalidArgument(format!("invalid axis component '{part}' in '{s}'"))
            })?;
        }
        Axis::new(DVec3::from_array(components))
    }
}

impl TryFrom<String> for Axis {
    type Error = JointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.to_string()
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (Axis::X, "x"),
            (Axis::Y, "y"),
            (Axis::Z, "z"),
            (Axis::NEG_X, "-x"),
            (Axis::NEG_Y, "-y"),
            (Axis::NEG_Z, "-z"),
        ];
        match names.iter().find(|(axis, _)| axis.0 == self.0) {
            Some((_, name)) => write!(f, "{name}"),
            None => write!(f, "{},{},{}", self.0.x, self.0.y, self.0.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(4.0, -5.0, 6.0);
        assert!((dot(a, b) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_product() {
        let c = cross(DVec3::X, DVec3::Y);
        assert!((c - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_cross_parallel_is_zero() {
        assert_eq!(cross(DVec3::X, DVec3::new(3.0, 0.0, 0.0)), DVec3::ZERO);
        assert_eq!(cross(DVec3::X, DVec3::new(-2.0, 0.0, 0.0)), DVec3::ZERO);
        // Nearly parallel within tolerance also collapses.
        assert_eq!(cross(DVec3::X, DVec3::new(1.0, 1e-9, 0.0)), DVec3::ZERO);
    }

    #[test]
    fn test_cross_zero_length_is_zero() {
        assert_eq!(cross(DVec3::ZERO, DVec3::Y), DVec3::ZERO);
        assert_eq!(cross(DVec3::Y, DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_normalize() {
        let n = normalize(DVec3::new(0.0, 3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert_eq!(normalize(DVec3::ZERO), DVec3::ZERO);
        assert_eq!(normalize(DVec3::new(f64::NAN, 0.0, 1.0)), DVec3::ZERO);
    }

    #[test]
    fn test_axis_parse_names() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("-Y".parse::<Axis>().unwrap(), Axis::NEG_Y);
        assert_eq!("+z".parse::<Axis>().unwrap(), Axis::Z);
    }

    #[test]
    fn test_axis_parse_components() {
        let axis: Axis = "0, 2, 0".parse().unwrap();
        assert_eq!(axis, Axis::Y);
        let diagonal: Axis = "1,1,0".parse().unwrap();
        assert!((diagonal.vec().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_parse_rejects_garbage() {
        assert!("w".parse::<Axis>().is_err());
        assert!("0,0,0".parse::<Axis>().is_err());
        assert!("1,a,0".parse::<Axis>().is_err());
    }

    #[test]
    fn test_axis_display() {
        assert_eq!(Axis::NEG_X.to_string(), "-x");
        assert_eq!(Axis::Z.to_string(), "z");
    }

    #[test]
    fn test_degrees_readout() {
        let q = quat_from_degrees(DVec3::new(0.0, 33.0, 0.0));
        let d = orient_degrees(q);
        assert!(d.x.abs() < 1e-9);
        assert!((d.y - 33.0).abs() < 1e-9);
        assert!(d.z.abs() < 1e-9);
    }

    #[test]
    fn test_degrees_order_x_first() {
        let q = quat_from_degrees(DVec3::new(10.0, 20.0, 30.0));
        let expected = DQuat::from_rotation_z(30f64.to_radians())
            * DQuat::from_rotation_y(20f64.to_radians())
            * DQuat::from_rotation_x(10f64.to_radians());
        assert!(angle_between_degrees(q, expected) < 1e-9);
    }
}
