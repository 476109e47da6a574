//! 3D ray for picking

use crate::error::Result;
use crate::vector::Vec3;

/// Half-line with a unit direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always unit length
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; fails if `direction` has zero length
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Self> {
        Ok(Self {
            origin,
            direction: direction.try_normalize()?,
        })
    }

    /// Ray from `start` towards `end`
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Result<Self> {
        Self::new(start, end - start)
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Component-wise reciprocal of the direction, for slab tests
    #[inline]
    pub fn inverse_direction(&self) -> Vec3 {
        Vec3::new(
            1.0 / self.direction.x,
            1.0 / self.direction.y,
            1.0 / self.direction.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathError;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)).unwrap();
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn test_from_identical_points_fails() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Ray::from_points(p, p), Err(MathError::DegenerateVector));
    }
}
