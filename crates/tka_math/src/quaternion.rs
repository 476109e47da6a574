//! Quaternion for 3D rotations

use crate::vector::Vec3;
use core::ops::Mul;

/// Unit quaternion representing a rotation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis and angle (radians). The axis need not be unit length.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let (sin, cos) = half.sin_cos();
        let axis = axis.normalize_or_zero();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Shortest-arc rotation taking unit vector `from` onto unit vector `to`.
    ///
    /// Both inputs must already be normalized. Built from the half-way vector,
    /// which stays accurate right up to the antiparallel case; only when
    /// `from + to` vanishes does it rotate by π about an axis perpendicular
    /// to `from`.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let Ok(half) = (from + to).try_normalize() else {
            return Self::from_axis_angle(from.any_orthogonal(), core::f32::consts::PI);
        };

        let axis = from.cross(half);
        Self::new(axis.x, axis.y, axis.z, from.dot(half))
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Rotation angle in radians, in [0, π]
    pub fn angle(self) -> f32 {
        2.0 * self.w.abs().clamp(0.0, 1.0).acos()
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product; `a * b` applies `b` first, then `a`.
impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity_leaves_vector() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!((Quat::IDENTITY * v - v).length() < 1e-6);
    }

    #[test]
    fn test_axis_angle_quarter_turn() {
        let q = Quat::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert!((q * Vec3::X - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_rotation_arc_maps_from_onto_to() {
        let from = Vec3::Z;
        let to = Vec3::new(1.0, 2.0, -0.5).normalize_or_zero();
        let q = Quat::from_rotation_arc(from, to);
        assert!((q * from - to).length() < 1e-5);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_arc_is_shortest() {
        // 90° apart: the shortest arc is exactly a quarter turn
        let q = Quat::from_rotation_arc(Vec3::Z, Vec3::Y);
        assert!((q.angle() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_arc_antiparallel() {
        let q = Quat::from_rotation_arc(Vec3::Z, Vec3::NEG_Z);
        assert!((q * Vec3::Z - Vec3::NEG_Z).length() < 1e-5);
        assert!((q.angle() - PI).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_arc_nearly_antiparallel() {
        let to = Vec3::new(0.001, 0.0, -1.0).normalize_or_zero();
        let q = Quat::from_rotation_arc(Vec3::Z, to);
        assert!((q * Vec3::Z - to).length() < 1e-5, "{:?}", q * Vec3::Z);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_arc_parallel_is_identity() {
        let q = Quat::from_rotation_arc(Vec3::Y, Vec3::Y);
        assert!((q.angle()).abs() < 1e-3);
        assert!((q * Vec3::X - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_composition_order() {
        let a = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let b = Quat::from_axis_angle(Vec3::X, FRAC_PI_2);
        // b after a: X -> Y (about Z) -> Z (about X)
        assert!(((b * a) * Vec3::X - Vec3::Z).length() < 1e-5);
        // a after b: X stays X (about X) -> Y (about Z)
        assert!(((a * b) * Vec3::X - Vec3::Y).length() < 1e-5);
    }
}
