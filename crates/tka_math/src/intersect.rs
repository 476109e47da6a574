//! Ray intersection tests used by surface picking
//!
//! - AABB (slab method) for the broad phase
//! - Triangle (Möller-Trumbore) for the exact hit

use crate::bounds::AABB;
use crate::ray::Ray;
use crate::vector::Vec3;

/// Result of a ray-triangle intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    /// Distance along ray to hit point
    pub distance: f32,
    /// Barycentric coordinates [w, u, v] where w = 1 - u - v
    pub barycentric: [f32; 3],
}

/// Ray-AABB intersection using the slab method
///
/// Returns the distance to the first intersection in front of the origin
/// (the exit distance when the origin is inside the box).
pub fn ray_aabb(ray: &Ray, aabb: &AABB) -> Option<f32> {
    let inv_dir = ray.inverse_direction();

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Ray-triangle intersection (Möller-Trumbore)
///
/// The front face is the one whose `(v1 - v0) x (v2 - v0)` normal points
/// back at the ray. With `cull_backface` only front faces are hit.
pub fn ray_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    cull_backface: bool,
) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    if cull_backface && a < 0.0 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON {
        Some(TriangleHit {
            distance: t,
            barycentric: [1.0 - u - v, u, v],
        })
    } else {
        None
    }
}
