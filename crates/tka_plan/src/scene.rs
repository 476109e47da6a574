//! Renderable artifacts produced by planning
//!
//! The scene is an append-only list of primitives (marker spheres, axis lines,
//! resection planes). Artifacts are never patched in place: a rebuild adds a
//! new artifact, and callers that want replacement remove the old one by id.

use std::fmt;

use serde::{Deserialize, Serialize};
use tka_math::{Mat4, Quat, Vec3};

use crate::landmark::LandmarkKind;

/// Handle to an artifact in a [`Scene`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact#{}", self.0)
    }
}

/// Material hints for a renderer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
    pub double_sided: bool,
}

impl Style {
    pub const fn new(color: u32) -> Self {
        Self { color, opacity: 1.0, double_sided: false }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(0xffffff)
    }
}

/// Sphere marking a captured landmark
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerArtifact {
    pub landmark: LandmarkKind,
    pub center: Vec3,
    pub radius: f32,
}

/// Line segment between two landmarks
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisLineArtifact {
    pub start: Vec3,
    pub end: Vec3,
}

impl AxisLineArtifact {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Bounded square plane
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneArtifact {
    pub center: Vec3,
    /// Unit facing direction, equal to `orientation * CANONICAL_PLANE_NORMAL`
    pub normal: Vec3,
    pub orientation: Quat,
    /// Side length
    pub size: f32,
}

impl PlaneArtifact {
    pub fn new(center: Vec3, orientation: Quat, size: f32) -> Self {
        Self {
            center,
            normal: orientation * tka_math::CANONICAL_PLANE_NORMAL,
            orientation,
            size,
        }
    }

    /// Model matrix placing the unit square in the world
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.center)
    }

    /// World-space corners, counter-clockwise when viewed against the normal
    pub fn corners(&self) -> [Vec3; 4] {
        let h = self.size * 0.5;
        [
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, -h, 0.0),
            Vec3::new(h, h, 0.0),
            Vec3::new(-h, h, 0.0),
        ]
        .map(|local| self.center + self.orientation * local)
    }

    /// Signed distance of `point` along the normal
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point - self.center)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactShape {
    Marker(MarkerArtifact),
    AxisLine(AxisLineArtifact),
    Plane(PlaneArtifact),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    #[serde(flatten)]
    pub shape: ArtifactShape,
    pub style: Style,
}

impl Artifact {
    pub fn as_plane(&self) -> Option<&PlaneArtifact> {
        match &self.shape {
            ArtifactShape::Plane(plane) => Some(plane),
            _ => None,
        }
    }

    pub fn as_axis_line(&self) -> Option<&AxisLineArtifact> {
        match &self.shape {
            ArtifactShape::AxisLine(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<&MarkerArtifact> {
        match &self.shape {
            ArtifactShape::Marker(marker) => Some(marker),
            _ => None,
        }
    }
}

/// Ordered collection of artifacts
#[derive(Clone, Debug, Default)]
pub struct Scene {
    artifacts: Vec<Artifact>,
    next_id: u64,
}

/// Serializable copy of a scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub artifacts: Vec<Artifact>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact and return its id
    pub fn add(&mut self, shape: ArtifactShape, style: Style) -> ArtifactId {
        let id = ArtifactId(self.next_id);
        self.next_id += 1;
        self.artifacts.push(Artifact { id, shape, style });
        id
    }

    pub fn remove(&mut self, id: ArtifactId) -> Option<Artifact> {
        let index = self.artifacts.iter().position(|a| a.id == id)?;
        Some(self.artifacts.remove(index))
    }

    pub fn get(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Artifacts in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn planes(&self) -> impl Iterator<Item = &PlaneArtifact> {
        self.artifacts.iter().filter_map(Artifact::as_plane)
    }

    pub fn axis_lines(&self) -> impl Iterator<Item = &AxisLineArtifact> {
        self.artifacts.iter().filter_map(Artifact::as_axis_line)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerArtifact> {
        self.artifacts.iter().filter_map(Artifact::as_marker)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot { artifacts: self.artifacts.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(y: f32) -> ArtifactShape {
        ArtifactShape::AxisLine(AxisLineArtifact { start: Vec3::ZERO, end: Vec3::new(0.0, y, 0.0) })
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.add(line(1.0), Style::default());
        let b = scene.add(line(2.0), Style::default());
        assert_ne!(a, b);

        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        let c = scene.add(line(3.0), Style::default());
        assert!(c > b);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.axis_lines().map(|l| l.length()).collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_unrotated_plane_faces_z() {
        let plane = PlaneArtifact::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, 10.0);
        assert_eq!(plane.normal, Vec3::Z);
        assert_eq!(plane.corners()[2], Vec3::new(6.0, 7.0, 3.0));
        assert_eq!(plane.signed_distance(Vec3::new(0.0, 0.0, 5.0)), 2.0);
        assert_eq!(plane.transform().get_translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_corners_lie_in_rotated_plane() {
        let orientation = Quat::from_rotation_arc(Vec3::Z, Vec3::Y);
        let plane = PlaneArtifact::new(Vec3::ZERO, orientation, 100.0);
        assert!(plane.normal.abs_diff_eq(Vec3::Y, 1e-6));
        for corner in plane.corners() {
            assert!(plane.signed_distance(corner).abs() < 1e-4);
            assert!((corner.length() - 50.0 * 2f32.sqrt()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_snapshot_is_tagged_json() {
        let mut scene = Scene::new();
        scene.add(
            ArtifactShape::Marker(MarkerArtifact {
                landmark: LandmarkKind::HipCenter,
                center: Vec3::ONE,
                radius: 2.0,
            }),
            Style::new(0xffff00),
        );
        let json = serde_json::to_value(scene.snapshot()).unwrap();
        let marker = &json["artifacts"][0];
        assert_eq!(marker["kind"], "marker");
        assert_eq!(marker["landmark"], "Hip Center");
        assert_eq!(marker["id"], 0);
        assert_eq!(marker["style"]["color"], 0xffff00);
    }
}
