//! Pickable bone surfaces

use thiserror::Error;
use tka_math::{ray_aabb, ray_triangle, Ray, Vec3, AABB};

/// Surface loading and construction errors
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary STL shorter than its declared facet count
    #[error("Truncated STL: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Unparseable coordinate in an ASCII STL
    #[error("Invalid number on line {line}: {text:?}")]
    InvalidNumber { line: usize, text: String },

    #[error("Mesh contains no triangles")]
    Empty,

    #[error("Triangle {triangle} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Ray hit on a single surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Index of the triangle that was hit
    pub triangle: u32,
}

/// Anything the picker can cast rays against
pub trait PickTarget {
    /// Label used in logs ("femur", "tibia")
    fn name(&self) -> &str;

    /// Closest hit in front of the ray origin
    fn raycast(&self, ray: &Ray) -> Option<RayHit>;
}

impl<T: PickTarget + ?Sized> PickTarget for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        (**self).raycast(ray)
    }
}

/// Indexed triangle mesh in world space
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    name: String,
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: AABB,
    cull_back_faces: bool,
}

impl SurfaceMesh {
    /// Build from indexed geometry, validating every index
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        if triangles.is_empty() {
            return Err(MeshError::Empty);
        }
        for (triangle, indices) in triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let bounds = AABB::from_points(&vertices);
        Ok(Self {
            name: name.into(),
            vertices,
            triangles,
            bounds,
            cull_back_faces: true,
        })
    }

    /// Build from unindexed triangles, as read from STL
    pub fn from_triangle_soup(
        name: impl Into<String>,
        facets: &[[Vec3; 3]],
    ) -> Result<Self, MeshError> {
        let vertices: Vec<Vec3> = facets.iter().flatten().copied().collect();
        let triangles = (0..facets.len() as u32)
            .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
            .collect();
        Self::new(name, vertices, triangles)
    }

    /// Front-facing only (the default) or double-sided picking
    pub fn with_back_face_culling(mut self, cull: bool) -> Self {
        self.cull_back_faces = cull;
        self
    }

    pub fn cull_back_faces(&self) -> bool {
        self.cull_back_faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn triangle(&self, index: usize) -> Option<[Vec3; 3]> {
        self.triangles.get(index).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }
}

impl PickTarget for SurfaceMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        // Padded so axis-aligned flat meshes still pass the slab test
        ray_aabb(ray, &self.bounds.expand(1e-3))?;

        let mut closest: Option<RayHit> = None;
        for (index, t) in self.triangles.iter().enumerate() {
            let v0 = self.vertices[t[0] as usize];
            let v1 = self.vertices[t[1] as usize];
            let v2 = self.vertices[t[2] as usize];

            if let Some(hit) = ray_triangle(ray, v0, v1, v2, self.cull_back_faces) {
                if closest.map_or(true, |c| hit.distance < c.distance) {
                    closest = Some(RayHit {
                        distance: hit.distance,
                        point: ray.at(hit.distance),
                        triangle: index as u32,
                    });
                }
            }
        }
        closest
    }
}
