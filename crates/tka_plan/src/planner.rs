//! Planning session state
//!
//! [`Planner`] owns everything a planning session mutates: the landmark
//! registry, the armed selection, the angular offsets, the camera/viewport and
//! the scene. Each user intent is one method call that runs to completion.

use serde::Serialize;
use tka_math::Vec3;

use crate::builder::{build_axis_line, build_plane, derive_axis, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO};
use crate::camera::{PerspectiveCamera, Viewport};
use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::landmark::{CommitOutcome, Landmark, LandmarkKind, LandmarkRegistry};
use crate::mesh::PickTarget;
use crate::offsets::{clamp_degrees, AngularOffsets};
use crate::picking::pick;
use crate::scene::{ArtifactId, ArtifactShape, MarkerArtifact, Scene, SceneSnapshot};
use crate::stl::load_stl_surface;

/// What a click did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// No landmark was armed; nothing was cast or stored
    NotArmed,
    /// The ray hit no surface; the landmark stays armed
    Missed,
    /// The hit point was stored under the armed name
    Committed(Landmark),
}

impl ClickOutcome {
    pub fn landmark(&self) -> Option<&Landmark> {
        match self {
            ClickOutcome::Committed(landmark) => Some(landmark),
            _ => None,
        }
    }
}

impl From<CommitOutcome> for ClickOutcome {
    fn from(outcome: CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Committed(landmark) => ClickOutcome::Committed(landmark),
            CommitOutcome::NothingArmed => ClickOutcome::NotArmed,
        }
    }
}

/// Serializable view of a planning session
#[derive(Clone, Debug, Serialize)]
pub struct PlanSnapshot {
    pub landmarks: Vec<Landmark>,
    pub armed: Option<LandmarkKind>,
    pub offsets: AngularOffsets,
    pub show_resection: bool,
    pub viewport: Viewport,
    pub scene: SceneSnapshot,
}

pub struct Planner {
    config: PlannerConfig,
    registry: LandmarkRegistry,
    offsets: AngularOffsets,
    scene: Scene,
    camera: PerspectiveCamera,
    viewport: Viewport,
    surfaces: Vec<Box<dyn PickTarget>>,
    show_resection: bool,
    last_plane: Option<ArtifactId>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(config.viewport.width, config.viewport.height);
        let camera = PerspectiveCamera::from_config(&config.camera, viewport.aspect());
        Ok(Self {
            config,
            registry: LandmarkRegistry::new(),
            offsets: AngularOffsets::ZERO,
            scene: Scene::new(),
            camera,
            viewport,
            surfaces: Vec::new(),
            show_resection: true,
            last_plane: None,
        })
    }

    /// Add a pickable surface
    pub fn add_surface<T: PickTarget + 'static>(&mut self, surface: T) {
        log::debug!("Added pick surface '{}'", surface.name());
        self.surfaces.push(Box::new(surface));
    }

    /// Load the femur and tibia STL files named in the configuration
    pub fn load_models(&mut self) -> Result<()> {
        let cull = self.config.picking.cull_back_faces;
        let models = self.config.models.clone();
        for (name, path) in [("femur", &models.femur), ("tibia", &models.tibia)] {
            let mesh = load_stl_surface(name, path)?.with_back_face_culling(cull);
            self.add_surface(mesh);
        }
        Ok(())
    }

    pub fn arm_landmark(&mut self, kind: LandmarkKind) {
        if let Some(previous) = self.registry.arm(kind) {
            log::debug!("Armed {} (replacing {})", kind, previous);
        } else {
            log::debug!("Armed {}", kind);
        }
    }

    /// Arm by display label, rejecting names outside the landmark set
    pub fn arm_landmark_named(&mut self, name: &str) -> Result<LandmarkKind> {
        let kind: LandmarkKind = name.parse()?;
        self.arm_landmark(kind);
        Ok(kind)
    }

    /// Pick the surface under a screen position and store it under the armed name
    pub fn click(&mut self, screen_x: f32, screen_y: f32) -> ClickOutcome {
        if !self.registry.is_armed() {
            log::debug!("Click at ({}, {}) ignored: no landmark armed", screen_x, screen_y);
            return ClickOutcome::NotArmed;
        }

        match pick(screen_x, screen_y, &self.viewport, &self.camera, &self.surfaces) {
            Some(hit) => self.commit_position(hit.point),
            None => {
                log::debug!("Click at ({}, {}) missed every surface", screen_x, screen_y);
                ClickOutcome::Missed
            }
        }
    }

    /// Store `position` under the armed name, as a successful pick would
    pub fn commit_position(&mut self, position: Vec3) -> ClickOutcome {
        let outcome = self.registry.commit(position);
        if let CommitOutcome::Committed(landmark) = outcome {
            log::info!("Captured {} at {:?}", landmark.name, landmark.position);
            self.scene.add(
                ArtifactShape::Marker(MarkerArtifact {
                    landmark: landmark.name,
                    center: landmark.position,
                    radius: self.config.marker.radius,
                }),
                self.config.marker.style(),
            );
        }
        outcome.into()
    }

    /// Arm `kind` and commit `position` in one step
    pub fn place(&mut self, kind: LandmarkKind, position: Vec3) -> ClickOutcome {
        self.arm_landmark(kind);
        self.commit_position(position)
    }

    /// Varus/valgus slider; clamps, then rebuilds the plane
    pub fn set_varus_valgus(&mut self, degrees: f32) -> Result<Option<ArtifactId>> {
        self.offsets.varus_valgus = self.clamp_offset("varus/valgus", degrees);
        self.create_perpendicular_plane()
    }

    /// Flexion/extension slider; clamps, then rebuilds the plane
    pub fn set_flexion_extension(&mut self, degrees: f32) -> Result<Option<ArtifactId>> {
        self.offsets.flexion_extension = self.clamp_offset("flexion/extension", degrees);
        self.create_perpendicular_plane()
    }

    /// Set both offsets with a single rebuild
    pub fn set_offsets(&mut self, offsets: AngularOffsets) -> Result<Option<ArtifactId>> {
        self.offsets = AngularOffsets::new(
            self.clamp_offset("varus/valgus", offsets.varus_valgus),
            self.clamp_offset("flexion/extension", offsets.flexion_extension),
        );
        self.create_perpendicular_plane()
    }

    fn clamp_offset(&self, label: &str, degrees: f32) -> f32 {
        let limit = self.config.offsets.limit_degrees;
        let clamped = clamp_degrees(degrees, limit);
        if clamped != degrees {
            log::debug!("Clamped {} offset {} to {}", label, degrees, clamped);
        }
        clamped
    }

    /// Draw the mechanical axis from hip center to femur center.
    ///
    /// Returns `None` until both landmarks are captured.
    pub fn update_axes(&mut self) -> Option<ArtifactId> {
        let (Some(hip), Some(femur)) = (
            self.registry.find(MECHANICAL_AXIS_TO).copied(),
            self.registry.find(MECHANICAL_AXIS_FROM).copied(),
        ) else {
            log::debug!(
                "Axis update skipped: need both {} and {}",
                MECHANICAL_AXIS_TO,
                MECHANICAL_AXIS_FROM
            );
            return None;
        };

        Some(build_axis_line(&mut self.scene, &hip, &femur, self.config.axis_line.style()))
    }

    /// Build the resection plane perpendicular to the mechanical axis.
    ///
    /// `Ok(None)` while a landmark is missing. A degenerate axis is returned as
    /// an error and leaves the scene untouched.
    pub fn create_perpendicular_plane(&mut self) -> Result<Option<ArtifactId>> {
        let axis = match derive_axis(&self.registry, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO) {
            Ok(axis) => axis,
            Err(e) if e.is_missing_landmark() => {
                log::debug!("Plane skipped: {}", e);
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Plane aborted: {}", e);
                return Err(e);
            }
        };
        let anchor = self
            .registry
            .find(MECHANICAL_AXIS_FROM)
            .map(|l| l.position)
            .ok_or(PlanError::MissingLandmark(MECHANICAL_AXIS_FROM))?;

        let id = build_plane(
            &mut self.scene,
            axis,
            anchor,
            self.config.plane.size,
            self.offsets,
            self.config.plane.style(),
        )
        .map_err(|e| {
            log::warn!("Plane aborted: {}", e);
            e
        })?;

        if let Some(previous) = self.last_plane.replace(id) {
            if self.config.replace_on_rebuild && self.scene.remove(previous).is_some() {
                log::debug!("Replaced plane {} with {}", previous, id);
            }
        }
        Ok(Some(id))
    }

    /// Viewport resize; keeps the camera aspect in step
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.camera.set_aspect(self.viewport.aspect());
        log::debug!("Viewport resized to {}x{}", width, height);
    }

    pub fn set_show_resection(&mut self, visible: bool) {
        self.show_resection = visible;
    }

    pub fn show_resection(&self) -> bool {
        self.show_resection
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &LandmarkRegistry {
        &self.registry
    }

    pub fn offsets(&self) -> AngularOffsets {
        self.offsets
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Most recently built plane, whether or not it is still in the scene
    pub fn last_plane(&self) -> Option<ArtifactId> {
        self.last_plane
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            landmarks: self.registry.as_slice().to_vec(),
            armed: self.registry.armed(),
            offsets: self.offsets,
            show_resection: self.show_resection,
            viewport: self.viewport,
            scene: self.scene.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SurfaceMesh;

    /// Large square in z = 0 facing the default camera
    fn backdrop() -> SurfaceMesh {
        let h = 50.0;
        SurfaceMesh::new(
            "backdrop",
            vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    fn planner() -> Planner {
        let mut planner = Planner::new(PlannerConfig::default()).unwrap();
        planner.add_surface(backdrop());
        planner
    }

    #[test]
    fn test_click_without_arm_is_ignored() {
        let mut planner = planner();
        assert_eq!(planner.click(640.0, 360.0), ClickOutcome::NotArmed);
        assert!(planner.registry().is_empty());
        assert!(planner.scene().is_empty());
    }

    #[test]
    fn test_click_commits_and_adds_marker() {
        let mut planner = planner();
        planner.arm_landmark(LandmarkKind::FemurCenter);

        let outcome = planner.click(640.0, 360.0);
        let landmark = outcome.landmark().copied().unwrap();
        assert_eq!(landmark.name, LandmarkKind::FemurCenter);
        assert!(landmark.position.abs_diff_eq(Vec3::ZERO, 1e-3));
        assert_eq!(planner.registry().armed(), None);

        let marker = planner.scene().markers().next().unwrap();
        assert_eq!(marker.landmark, LandmarkKind::FemurCenter);
        assert_eq!(marker.radius, 2.0);
    }

    #[test]
    fn test_missed_click_keeps_landmark_armed() {
        let mut planner = Planner::new(PlannerConfig::default()).unwrap();
        planner.arm_landmark(LandmarkKind::HipCenter);
        assert_eq!(planner.click(640.0, 360.0), ClickOutcome::Missed);
        assert_eq!(planner.registry().armed(), Some(LandmarkKind::HipCenter));
    }

    #[test]
    fn test_arm_by_name() {
        let mut planner = planner();
        assert_eq!(planner.arm_landmark_named("Medial Epicondyle").unwrap(), LandmarkKind::MedialEpicondyle);
        assert!(matches!(
            planner.arm_landmark_named("Patella"),
            Err(PlanError::UnknownLandmark(_))
        ));
        assert_eq!(planner.registry().armed(), Some(LandmarkKind::MedialEpicondyle));
    }

    #[test]
    fn test_sliders_clamp() {
        let mut planner = planner();
        assert_eq!(planner.set_varus_valgus(45.0).unwrap(), None);
        assert_eq!(planner.set_flexion_extension(-11.0).unwrap(), None);
        assert_eq!(planner.offsets(), AngularOffsets::new(10.0, -10.0));
    }

    #[test]
    fn test_top_down_camera_picks_floor() {
        let mut config = PlannerConfig::default();
        config.camera.position = [0.0, 10.0, 0.0];
        let mut planner = Planner::new(config).unwrap();

        let h = 50.0;
        let floor = SurfaceMesh::new(
            "floor",
            vec![
                Vec3::new(-h, 0.0, -h),
                Vec3::new(h, 0.0, -h),
                Vec3::new(h, 0.0, h),
                Vec3::new(-h, 0.0, h),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
        .with_back_face_culling(false);
        planner.add_surface(floor);

        planner.arm_landmark(LandmarkKind::FemurCenter);
        let landmark = planner.click(640.0, 360.0).landmark().copied().unwrap();
        assert!(landmark.position.abs_diff_eq(Vec3::ZERO, 1e-3), "{:?}", landmark.position);
    }

    #[test]
    fn test_resize_updates_camera_aspect() {
        let mut planner = planner();
        planner.resize(800, 800);
        assert_eq!(planner.viewport(), Viewport::new(800, 800));
        assert_eq!(planner.camera().aspect, 1.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlannerConfig::default().with_plane_size(-1.0);
        assert!(matches!(Planner::new(config), Err(PlanError::Config(_))));
    }
}
