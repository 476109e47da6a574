//! # tka_math - Geometry primitives for landmark planning
//!
//! Small, dependency-light math used by the planner: vectors, a column-major
//! 4x4 matrix for camera projection, quaternions, rays, intersection tests and
//! the plane orientation helpers that turn a mechanical axis into a plane pose.

pub mod error;
pub mod vector;
pub mod matrix;
pub mod quaternion;
pub mod bounds;
pub mod ray;
pub mod intersect;
pub mod orientation;

pub use error::*;
pub use vector::*;
pub use matrix::*;
pub use quaternion::*;
pub use bounds::*;
pub use ray::*;
pub use intersect::*;
pub use orientation::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

pub mod prelude {
    pub use crate::error::{MathError, Result};
    pub use crate::vector::{Vec3, Vec4};
    pub use crate::matrix::Mat4;
    pub use crate::quaternion::Quat;
    pub use crate::bounds::AABB;
    pub use crate::ray::Ray;
    pub use crate::intersect::{ray_aabb, ray_triangle, TriangleHit};
    pub use crate::orientation::{
        apply_angular_offset, angular_offset_rotation, orientation_from_normal,
        CANONICAL_PLANE_NORMAL, FLEXION_EXTENSION_AXIS, VARUS_VALGUS_AXIS,
    };
    pub use crate::{radians, degrees};
}
