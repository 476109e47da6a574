//! Screen-space picking against bone surfaces
//!
//! A click is mapped to normalized device coordinates, unprojected into a ray
//! from the camera eye, and tested against every candidate surface. The
//! closest hit wins. Picking has no side effects; committing the point is the
//! planner's decision.

use tka_math::{Ray, Vec3};

use crate::camera::{PerspectiveCamera, Viewport};
use crate::mesh::PickTarget;

/// Closest surface point under the cursor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Distance from the camera eye
    pub distance: f32,
    /// Index of the surface in the candidate list
    pub surface: usize,
    pub triangle: u32,
}

/// Screen pixels to normalized device coordinates
pub fn screen_to_ndc(screen_x: f32, screen_y: f32, viewport: &Viewport) -> [f32; 2] {
    viewport.to_ndc(screen_x, screen_y)
}

/// World-space ray under a screen position
pub fn screen_to_ray(
    screen_x: f32,
    screen_y: f32,
    viewport: &Viewport,
    camera: &PerspectiveCamera,
) -> Option<Ray> {
    let ndc = screen_to_ndc(screen_x, screen_y, viewport);
    match camera.ray_through_ndc(ndc) {
        Ok(ray) => Some(ray),
        Err(e) => {
            log::debug!("No pick ray at ({}, {}): {}", screen_x, screen_y, e);
            None
        }
    }
}

/// Closest hit among `surfaces` under the given screen position
pub fn pick<S: PickTarget>(
    screen_x: f32,
    screen_y: f32,
    viewport: &Viewport,
    camera: &PerspectiveCamera,
    surfaces: &[S],
) -> Option<SurfaceHit> {
    let ray = screen_to_ray(screen_x, screen_y, viewport, camera)?;
    pick_ray(&ray, surfaces)
}

/// Closest hit among `surfaces` along `ray`
pub fn pick_ray<S: PickTarget>(ray: &Ray, surfaces: &[S]) -> Option<SurfaceHit> {
    surfaces
        .iter()
        .enumerate()
        .filter_map(|(surface, target)| {
            target.raycast(ray).map(|hit| SurfaceHit {
                point: hit.point,
                distance: hit.distance,
                surface,
                triangle: hit.triangle,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
