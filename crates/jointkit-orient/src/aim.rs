use glam::{DMat3, DQuat, DVec3};

use jointkit_core::math::{dot, is_usable, normalize, PARALLEL_EPSILON};
use jointkit_core::{JointError, JointResult};

/// A joint's local aim and up axes, completed to a right-handed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimAxes {
    pub aim: DVec3,
    /// Up axis with any component along `aim` removed.
    pub up: DVec3,
    pub side: DVec3,
}

impl AimAxes {
    pub fn new(aim: DVec3, up: DVec3) -> JointResult<Self> {
        let aim = normalize(aim);
        if !is_usable(aim) {
            return Err(JointError::DegenerateAxes(
                "aim axis has zero length".to_string(),
            ));
        }
        let up = perpendicular_part(up, aim).ok_or_else(|| {
            JointError::DegenerateAxes(format!("up axis {up} is parallel to aim axis {aim}"))
        })?;
        Ok(Self {
            aim,
            up,
            side: aim.cross(up),
        })
    }
}

/// Unit component of `v` perpendicular to the unit vector `axis`, or `None`
/// when `v` is (nearly) parallel to it.
fn perpendicular_part(v: DVec3, axis: DVec3) -> Option<DVec3> {
    let length = v.length();
    if !(v.is_finite() && length > 0.0) {
        return None;
    }
    let rest = v - axis * dot(v, axis);
    if rest.length() <= PARALLEL_EPSILON * length {
        return None;
    }
    Some(normalize(rest))
}

/// World rotation that points `axes.aim` along `direction` and turns
/// `axes.up` as close to `up` as the aim allows.
///
/// When `up` is parallel to the aim direction, `reference` settles the
/// twist instead; if that is parallel too, any perpendicular is used.
pub fn look_at(
    direction: DVec3,
    up: DVec3,
    reference: DVec3,
    axes: &AimAxes,
) -> JointResult<DQuat> {
    let aim = normalize(direction);
    if !is_usable(aim) {
        return Err(JointError::DegenerateAxes(
            "aim target sits on top of the joint".to_string(),
        ));
    }
    let world_up = perpendicular_part(up, aim)
        .or_else(|| {
            tracing::debug!("up vector {up} is parallel to aim {aim}, using reference {reference}");
            perpendicular_part(reference, aim)
        })
        .unwrap_or_else(|| aim.any_orthonormal_vector());
    let world = DMat3::from_cols(aim, world_up, aim.cross(world_up));
    let local = DMat3::from_cols(axes.aim, axes.up, axes.side);
    Ok(DQuat::from_mat3(&(world * local.transpose())).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_axes_orthonormalize_up() {
        let axes = AimAxes::new(DVec3::X, DVec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(close(axes.up, DVec3::Y));
        assert!(close(axes.side, DVec3::Z));
    }

    #[test]
    fn test_axes_reject_parallel() {
        assert!(AimAxes::new(DVec3::X, DVec3::NEG_X).is_err());
        assert!(AimAxes::new(DVec3::ZERO, DVec3::Y).is_err());
    }

    #[test]
    fn test_look_at_identity() {
        let axes = AimAxes::new(DVec3::X, DVec3::Y).unwrap();
        let q = look_at(DVec3::new(5.0, 0.0, 0.0), DVec3::Y, DVec3::Y, &axes).unwrap();
        assert!(q.angle_between(DQuat::IDENTITY) < 1e-9);
    }

    #[test]
    fn test_look_at_points_aim_and_up() {
        let axes = AimAxes::new(DVec3::Z, DVec3::NEG_Y).unwrap();
        let direction = DVec3::new(1.0, 2.0, -0.5);
        let up = DVec3::new(0.2, 0.1, 1.0);
        let q = look_at(direction, up, DVec3::Y, &axes).unwrap();
        assert!(close(q * axes.aim, direction.normalize()));
        let realized_up = q * axes.up;
        assert!(dot(realized_up, direction).abs() < 1e-9);
        assert!(dot(realized_up, up) > 0.0);
    }

    #[test]
    fn test_look_at_falls_back_to_reference() {
        let axes = AimAxes::new(DVec3::X, DVec3::Y).unwrap();
        let q = look_at(DVec3::Y, DVec3::Y, DVec3::Z, &axes).unwrap();
        assert!(close(q * DVec3::X, DVec3::Y));
        assert!(close(q * DVec3::Y, DVec3::Z));
    }

    #[test]
    fn test_look_at_any_perpendicular_last() {
        let axes = AimAxes::new(DVec3::X, DVec3::Y).unwrap();
        let q = look_at(DVec3::Y, DVec3::Y, DVec3::NEG_Y, &axes).unwrap();
        assert!(close(q * DVec3::X, DVec3::Y));
        assert!(dot(q * DVec3::Y, DVec3::Y).abs() < 1e-9);
    }

    #[test]
    fn test_look_at_zero_direction() {
        let axes = AimAxes::new(DVec3::X, DVec3::Y).unwrap();
        assert!(matches!(
            look_at(DVec3::ZERO, DVec3::Y, DVec3::Y, &axes),
            Err(JointError::DegenerateAxes(_))
        ));
    }
}
