//! Perspective camera and viewport used to turn clicks into rays

use serde::{Deserialize, Serialize};
use tka_math::{radians, Mat4, Ray, Result as MathResult, Vec3};

use crate::config::CameraConfig;

/// Pixel dimensions of the rendered viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1.0 for a collapsed viewport
    pub fn aspect(&self) -> f32 {
        if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Screen pixels (origin top-left, y down) to normalized device coordinates
    pub fn to_ndc(&self, screen_x: f32, screen_y: f32) -> [f32; 2] {
        let width = self.width.max(1) as f32;
        let height = self.height.max(1) as f32;
        [
            (screen_x / width) * 2.0 - 1.0,
            -(screen_y / height) * 2.0 + 1.0,
        ]
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Pinhole camera looking from `position` at `target`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_degrees,
            aspect,
            near: 1.0,
            far: 1000.0,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::from_array(config.up),
            fov_y_degrees: config.fov_y_degrees,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(radians(self.fov_y_degrees), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera eye through a point in normalized device coordinates
    pub fn ray_through_ndc(&self, ndc: [f32; 2]) -> MathResult<Ray> {
        let inv_view_proj = self.view_projection().inverse();
        let on_far_plane = inv_view_proj.transform_point(Vec3::new(ndc[0], ndc[1], 1.0));
        Ray::from_points(self.position, on_far_plane)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), Viewport::default().aspect())
    }
}
