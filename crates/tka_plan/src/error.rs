//! Error types for planning operations

use thiserror::Error;
use tka_math::MathError;

use crate::config::ConfigError;
use crate::landmark::LandmarkKind;
use crate::mesh::MeshError;

/// Planning errors
#[derive(Debug, Error)]
pub enum PlanError {
    /// Name outside the fixed landmark set
    #[error("Unknown landmark: {0:?}")]
    UnknownLandmark(String),

    /// A landmark required for a derivation has not been captured yet
    #[error("Landmark not captured yet: {0}")]
    MissingLandmark(LandmarkKind),

    /// The two landmarks of an axis coincide
    #[error("Cannot derive an axis from coincident landmarks: {0}")]
    DegenerateAxis(#[from] MathError),

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A surface mesh could not be loaded
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl PlanError {
    /// Missing prerequisites are skipped silently rather than reported
    pub fn is_missing_landmark(&self) -> bool {
        matches!(self, PlanError::MissingLandmark(_))
    }
}

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;
