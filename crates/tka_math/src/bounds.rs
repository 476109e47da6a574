//! Axis-aligned bounds for broad-phase picking

use crate::vector::Vec3;

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Empty (inverted) box; expanding it by any point yields that point
    pub const EMPTY: Self = Self {
        min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
        max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        points
            .iter()
            .fold(Self::EMPTY, |aabb, &point| aabb.expand_to_include(point))
    }

    /// min <= max on every axis
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grow uniformly; used to keep flat meshes hittable by the slab test
    #[inline]
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = AABB::from_points(&[
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(3.0, -4.0, 1.0),
            Vec3::new(0.0, 0.0, -2.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_empty_is_invalid() {
        assert!(!AABB::EMPTY.is_valid());
        assert!(!AABB::from_points(&[]).is_valid());
        assert!(AABB::from_points(&[Vec3::ONE]).is_valid());
    }

    #[test]
    fn test_contains_point() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::ONE).expand(0.5);
        assert!(aabb.contains_point(Vec3::splat(1.25)));
        assert!(!aabb.contains_point(Vec3::splat(1.75)));
    }
}
