//! Planner configuration
//!
//! Loaded from TOML. Every section and field is optional and falls back to the
//! defaults below:
//!
//! ```toml
//! replace_on_rebuild = false
//!
//! [camera]
//! fov_y_degrees = 45.0
//! near = 1.0
//! far = 1000.0
//! position = [0.0, 0.0, 5.0]
//! target = [0.0, 0.0, 0.0]
//!
//! [viewport]
//! width = 1280
//! height = 720
//!
//! [plane]
//! size = 100.0
//! color = 0x00ff00
//! opacity = 0.5
//!
//! [marker]
//! radius = 2.0
//! color = 0xffff00
//!
//! [axis_line]
//! color = 0x0000ff
//!
//! [offsets]
//! limit_degrees = 10.0
//!
//! [picking]
//! cull_back_faces = true
//!
//! [models]
//! femur = "models/Right_Femur.stl"
//! tibia = "models/Right_Tibia.stl"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tka_math::Vec3;

use crate::offsets::DEFAULT_OFFSET_LIMIT_DEGREES;
use crate::scene::Style;

/// Errors from loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

/// Resection plane appearance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Side length of the square
    pub size: f32,
    pub color: u32,
    pub opacity: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self { size: 100.0, color: 0x00ff00, opacity: 0.5 }
    }
}

impl PlaneConfig {
    pub fn style(&self) -> Style {
        Style::new(self.color).with_opacity(self.opacity).double_sided()
    }
}

/// Landmark marker spheres
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub radius: f32,
    pub color: u32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self { radius: 2.0, color: 0xffff00 }
    }
}

impl MarkerConfig {
    pub fn style(&self) -> Style {
        Style::new(self.color)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLineConfig {
    pub color: u32,
}

impl Default for AxisLineConfig {
    fn default() -> Self {
        Self { color: 0x0000ff }
    }
}

impl AxisLineConfig {
    pub fn style(&self) -> Style {
        Style::new(self.color)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetsConfig {
    /// Slider range in degrees either side of zero
    pub limit_degrees: f32,
}

impl Default for OffsetsConfig {
    fn default() -> Self {
        Self { limit_degrees: DEFAULT_OFFSET_LIMIT_DEGREES }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub cull_back_faces: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self { cull_back_faces: true }
    }
}

/// Bone surface files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub femur: PathBuf,
    pub tibia: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            femur: PathBuf::from("models/Right_Femur.stl"),
            tibia: PathBuf::from("models/Right_Tibia.stl"),
        }
    }
}

/// Top-level planner configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Remove the previously built plane when a new one is built
    pub replace_on_rebuild: bool,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
    pub plane: PlaneConfig,
    pub marker: MarkerConfig,
    pub axis_line: AxisLineConfig,
    pub offsets: OffsetsConfig,
    pub picking: PickingConfig,
    pub models: ModelsConfig,
}

impl PlannerConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded planner config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given and present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                log::info!("Config {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.plane.size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "plane.size must be positive, got {}",
                self.plane.size
            )));
        }
        if !(self.marker.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "marker.radius must be positive, got {}",
                self.marker.radius
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes need 0 < near < far, got near {} far {}",
                self.camera.near, self.camera.far
            )));
        }
        let view = Vec3::from_array(self.camera.target) - Vec3::from_array(self.camera.position);
        if view.try_normalize().is_err() {
            return Err(ConfigError::Invalid(format!(
                "camera.position and camera.target must differ, both are {:?}",
                self.camera.position
            )));
        }
        if !(self.offsets.limit_degrees >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "offsets.limit_degrees must be non-negative, got {}",
                self.offsets.limit_degrees
            )));
        }
        Ok(())
    }

    pub fn with_replace_on_rebuild(mut self, replace: bool) -> Self {
        self.replace_on_rebuild = replace;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = ViewportConfig { width, height };
        self
    }

    pub fn with_plane_size(mut self, size: f32) -> Self {
        self.plane.size = size;
        self
    }

    pub fn with_back_face_culling(mut self, cull: bool) -> Self {
        self.picking.cull_back_faces = cull;
        self
    }
}
