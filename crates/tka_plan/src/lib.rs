//! # tka_plan - Landmark picking and resection planning
//!
//! Turns clicks on bone surfaces into named anatomical landmarks, and turns
//! landmarks into a mechanical axis and a resection plane perpendicular to it.
//!
//! # Architecture
//!
//! ```text
//!  click (x, y) ──► picking ──► LandmarkRegistry ──► builder ──► Scene
//!                    ▲  ▲           (armed name)        ▲
//!       PerspectiveCamera  PickTarget surfaces    AngularOffsets
//! ```
//!
//! [`Planner`] owns all of this state and exposes one method per user intent
//! (arm a landmark, click, move a slider, press a button). Everything runs
//! synchronously on the caller's thread.
//!
//! # Example
//!
//! ```ignore
//! use tka_plan::prelude::*;
//!
//! let mut planner = Planner::new(PlannerConfig::default())?;
//! planner.add_surface(load_stl_surface("femur", "models/Right_Femur.stl")?);
//!
//! planner.arm_landmark(LandmarkKind::FemurCenter);
//! planner.click(640.0, 360.0);
//! planner.arm_landmark(LandmarkKind::HipCenter);
//! planner.click(640.0, 120.0);
//!
//! planner.create_perpendicular_plane()?;
//! planner.set_varus_valgus(3.0)?;
//! ```

pub mod builder;
pub mod camera;
pub mod config;
pub mod error;
pub mod landmark;
pub mod mesh;
pub mod offsets;
pub mod picking;
pub mod planner;
pub mod scene;
pub mod stl;

pub mod prelude {
    //! Common imports for planning
    pub use crate::builder::{
        build_axis_line, build_plane, derive_axis, MECHANICAL_AXIS_FROM, MECHANICAL_AXIS_TO,
    };
    pub use crate::camera::{PerspectiveCamera, Viewport};
    pub use crate::config::{ConfigError, PlannerConfig};
    pub use crate::error::{PlanError, Result};
    pub use crate::landmark::{CommitOutcome, Landmark, LandmarkKind, LandmarkRegistry};
    pub use crate::mesh::{MeshError, PickTarget, RayHit, SurfaceMesh};
    pub use crate::offsets::AngularOffsets;
    pub use crate::picking::{pick, pick_ray, screen_to_ndc, screen_to_ray, SurfaceHit};
    pub use crate::planner::{ClickOutcome, PlanSnapshot, Planner};
    pub use crate::scene::{
        Artifact, ArtifactId, ArtifactShape, AxisLineArtifact, MarkerArtifact, PlaneArtifact, Scene,
        SceneSnapshot, Style,
    };
    pub use crate::stl::{load_stl, load_stl_surface, parse_stl};
}

pub use prelude::*;
