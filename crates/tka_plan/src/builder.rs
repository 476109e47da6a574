//! Mechanical axis and resection plane construction

use tka_math::{orientation_from_normal, Vec3};

use crate::error::{PlanError, Result};
use crate::landmark::{Landmark, LandmarkKind, LandmarkRegistry};
use crate::offsets::AngularOffsets;
use crate::scene::{ArtifactId, ArtifactShape, AxisLineArtifact, PlaneArtifact, Scene, Style};

/// Start of the mechanical axis; the plane is anchored here
pub const MECHANICAL_AXIS_FROM: LandmarkKind = LandmarkKind::FemurCenter;

/// End of the mechanical axis
pub const MECHANICAL_AXIS_TO: LandmarkKind = LandmarkKind::HipCenter;

/// Unit direction from landmark `from` to landmark `to`.
///
/// Uses the first captured entry of each name. Fails with
/// [`PlanError::MissingLandmark`] if either is absent and
/// [`PlanError::DegenerateAxis`] if they coincide.
pub fn derive_axis(registry: &LandmarkRegistry, from: LandmarkKind, to: LandmarkKind) -> Result<Vec3> {
    let start = registry.find(from).ok_or(PlanError::MissingLandmark(from))?;
    let end = registry.find(to).ok_or(PlanError::MissingLandmark(to))?;
    Ok((end.position - start.position).try_normalize()?)
}

/// Append a square plane facing `axis` (after `offsets`) centered on `anchor`.
pub fn build_plane(
    scene: &mut Scene,
    axis: Vec3,
    anchor: Vec3,
    size: f32,
    offsets: AngularOffsets,
    style: Style,
) -> Result<ArtifactId> {
    let adjusted = offsets.apply(axis);
    let orientation = orientation_from_normal(adjusted)?;
    let plane = PlaneArtifact::new(anchor, orientation, size);

    let id = scene.add(ArtifactShape::Plane(plane), style);
    log::info!(
        "Built plane {} at {:?} facing {:?} (varus/valgus {}°, flexion/extension {}°)",
        id,
        anchor,
        plane.normal,
        offsets.varus_valgus,
        offsets.flexion_extension
    );
    Ok(id)
}

/// Append a line segment from `a` to `b`
pub fn build_axis_line(scene: &mut Scene, a: &Landmark, b: &Landmark, style: Style) -> ArtifactId {
    let id = scene.add(
        ArtifactShape::AxisLine(AxisLineArtifact { start: a.position, end: b.position }),
        style,
    );
    log::info!("Built axis line {} from {} to {}", id, a.name, b.name);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(points: &[(LandmarkKind, Vec3)]) -> LandmarkRegistry {
        let mut registry = LandmarkRegistry::new();
        for &(kind, position) in points {
            registry.arm(kind);
            registry.commit(position);
        }
        registry
    }

    #[test]
    fn test_axis_between_landmarks() {
        let registry = registry(&[
            (LandmarkKind::FemurCenter, Vec3::ZERO),
            (LandmarkKind::HipCenter, Vec3::new(0.0, 100.0, 0.0)),
        ]);
        let axis = derive_axis(&registry, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO).unwrap();
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-6));

        let reverse = derive_axis(&registry, MECHANICAL_AXIS_TO, MECHANICAL_AXIS_FROM).unwrap();
        assert_eq!(reverse, -axis);
    }

    #[test]
    fn test_missing_landmark() {
        let registry = registry(&[(LandmarkKind::FemurCenter, Vec3::ZERO)]);
        let err = derive_axis(&registry, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO).unwrap_err();
        assert!(matches!(err, PlanError::MissingLandmark(LandmarkKind::HipCenter)));
    }

    #[test]
    fn test_coincident_landmarks() {
        let p = Vec3::new(4.0, 5.0, 6.0);
        let registry = registry(&[(LandmarkKind::FemurCenter, p), (LandmarkKind::HipCenter, p)]);
        let err = derive_axis(&registry, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO).unwrap_err();
        assert!(matches!(err, PlanError::DegenerateAxis(_)));
    }

    #[test]
    fn test_plane_faces_axis() {
        let mut scene = Scene::new();
        let id = build_plane(&mut scene, Vec3::Y, Vec3::ZERO, 100.0, AngularOffsets::ZERO, Style::default())
            .unwrap();

        let plane = scene.get(id).and_then(|a| a.as_plane()).unwrap();
        assert_eq!(plane.center, Vec3::ZERO);
        assert_eq!(plane.size, 100.0);
        assert!(plane.normal.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_plane_facing_away_from_canonical_normal() {
        let mut scene = Scene::new();
        let id = build_plane(&mut scene, Vec3::NEG_Z, Vec3::ONE, 10.0, AngularOffsets::ZERO, Style::default())
            .unwrap();
        let plane = scene.get(id).and_then(|a| a.as_plane()).unwrap();
        assert!(plane.normal.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_degenerate_plane_leaves_scene_untouched() {
        let mut scene = Scene::new();
        let result = build_plane(&mut scene, Vec3::ZERO, Vec3::ZERO, 100.0, AngularOffsets::ZERO, Style::default());
        assert!(matches!(result, Err(PlanError::DegenerateAxis(_))));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_axis_line_endpoints() {
        let mut scene = Scene::new();
        let hip = Landmark::new(LandmarkKind::HipCenter, Vec3::new(0.0, 100.0, 0.0));
        let femur = Landmark::new(LandmarkKind::FemurCenter, Vec3::ZERO);
        let id = build_axis_line(&mut scene, &hip, &femur, Style::new(0x0000ff));

        let line = scene.get(id).and_then(|a| a.as_axis_line()).unwrap();
        assert_eq!(line.start, hip.position);
        assert_eq!(line.end, femur.position);
        assert_eq!(line.length(), 100.0);
    }
}
