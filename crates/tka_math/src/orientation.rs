//! Plane orientation from a mechanical axis
//!
//! A resection plane is modelled as an unrotated square facing
//! [`CANONICAL_PLANE_NORMAL`], rotated by the shortest arc onto the target
//! normal. Clinical corrections are applied to the normal beforehand:
//!
//! 1. varus/valgus about [`VARUS_VALGUS_AXIS`] (anterior-posterior, coronal tilt)
//! 2. flexion/extension about [`FLEXION_EXTENSION_AXIS`] (medial-lateral, sagittal tilt)
//!
//! The order is fixed. The rotations do not commute, so swapping them would
//! move the plane for any non-zero pair of angles.

use crate::error::Result;
use crate::quaternion::Quat;
use crate::radians;
use crate::vector::Vec3;

/// Facing direction of an unrotated plane artifact
pub const CANONICAL_PLANE_NORMAL: Vec3 = Vec3::Z;

/// Rotation axis for the varus/valgus angle
pub const VARUS_VALGUS_AXIS: Vec3 = Vec3::Z;

/// Rotation axis for the flexion/extension angle
pub const FLEXION_EXTENSION_AXIS: Vec3 = Vec3::X;

/// Minimal rotation taking [`CANONICAL_PLANE_NORMAL`] onto `target_normal`.
///
/// `target_normal` is normalized first, so any non-zero direction works.
pub fn orientation_from_normal(target_normal: Vec3) -> Result<Quat> {
    let target = target_normal.try_normalize()?;
    Ok(Quat::from_rotation_arc(CANONICAL_PLANE_NORMAL, target))
}

/// Combined correction rotation: varus/valgus first, then flexion/extension.
pub fn angular_offset_rotation(varus_valgus_deg: f32, flexion_extension_deg: f32) -> Quat {
    let varus_valgus = Quat::from_axis_angle(VARUS_VALGUS_AXIS, radians(varus_valgus_deg));
    let flexion_extension =
        Quat::from_axis_angle(FLEXION_EXTENSION_AXIS, radians(flexion_extension_deg));
    flexion_extension * varus_valgus
}

/// Rotate `normal` by the two clinical offsets (degrees).
pub fn apply_angular_offset(normal: Vec3, varus_valgus_deg: f32, flexion_extension_deg: f32) -> Vec3 {
    angular_offset_rotation(varus_valgus_deg, flexion_extension_deg) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathError;

    fn sample_normals() -> Vec<Vec3> {
        let mut normals = vec![
            Vec3::X, Vec3::Y, Vec3::Z,
            Vec3::NEG_X, Vec3::NEG_Y, Vec3::NEG_Z,
            // Within a fraction of a degree of the canonical normal and its opposite
            Vec3::new(0.001, 0.0, -1.0).normalize_or_zero(),
            Vec3::new(0.0, -0.0004, -1.0).normalize_or_zero(),
            Vec3::new(0.001, 0.0, 1.0).normalize_or_zero(),
        ];
        // Deterministic spread over the sphere
        for i in 0..24 {
            let theta = i as f32 * 0.7;
            let phi = i as f32 * 0.31 - 3.0;
            normals.push(
                Vec3::new(phi.cos() * theta.cos(), phi.sin(), phi.cos() * theta.sin())
                    .normalize_or_zero(),
            );
        }
        normals
    }

    #[test]
    fn test_orientation_round_trip() {
        for n in sample_normals() {
            let q = orientation_from_normal(n).unwrap();
            let mapped = q * CANONICAL_PLANE_NORMAL;
            assert!(mapped.abs_diff_eq(n, 1e-5), "{:?} -> {:?}", n, mapped);
        }
    }

    #[test]
    fn test_orientation_is_minimal() {
        for n in sample_normals() {
            let q = orientation_from_normal(n).unwrap();
            let expected = CANONICAL_PLANE_NORMAL.dot(n).clamp(-1.0, 1.0).acos();
            assert!((q.angle() - expected).abs() < 1e-3, "{:?}", n);
        }
    }

    #[test]
    fn test_orientation_of_zero_normal_fails() {
        assert_eq!(orientation_from_normal(Vec3::ZERO), Err(MathError::DegenerateVector));
    }

    #[test]
    fn test_zero_offset_is_identity() {
        for n in sample_normals() {
            assert!(apply_angular_offset(n, 0.0, 0.0).abs_diff_eq(n, 1e-6));
        }
    }

    #[test]
    fn test_varus_valgus_tilts_in_coronal_plane() {
        let n = apply_angular_offset(Vec3::Y, 10.0, 0.0);
        assert!(n.z.abs() < 1e-6);
        assert!((n.y - radians(10.0).cos()).abs() < 1e-5);
        assert!((n.x + radians(10.0).sin()).abs() < 1e-5);
    }

    #[test]
    fn test_flexion_extension_tilts_in_sagittal_plane() {
        let n = apply_angular_offset(Vec3::Y, 0.0, 10.0);
        assert!(n.x.abs() < 1e-6);
        assert!((n.z - radians(10.0).sin()).abs() < 1e-5);
    }

    #[test]
    fn test_offsets_preserve_length() {
        for n in sample_normals() {
            let adjusted = apply_angular_offset(n, -7.5, 4.0);
            assert!((adjusted.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_offset_order_is_varus_valgus_first() {
        let n = Vec3::Y;
        let (vv, fe) = (10.0, 10.0);

        let expected = Quat::from_axis_angle(FLEXION_EXTENSION_AXIS, radians(fe))
            * (Quat::from_axis_angle(VARUS_VALGUS_AXIS, radians(vv)) * n);
        let swapped = Quat::from_axis_angle(VARUS_VALGUS_AXIS, radians(vv))
            * (Quat::from_axis_angle(FLEXION_EXTENSION_AXIS, radians(fe)) * n);

        let actual = apply_angular_offset(n, vv, fe);
        assert!(actual.abs_diff_eq(expected, 1e-5));
        assert!(!actual.abs_diff_eq(swapped, 1e-4));
    }
}
