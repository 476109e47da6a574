//! Clinical angular offsets applied to the resection plane

use serde::{Deserialize, Serialize};
use tka_math::{angular_offset_rotation, Quat, Vec3};

/// Default slider range, in degrees either side of zero
pub const DEFAULT_OFFSET_LIMIT_DEGREES: f32 = 10.0;

/// Varus/valgus and flexion/extension corrections, in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AngularOffsets {
    pub varus_valgus: f32,
    pub flexion_extension: f32,
}

impl AngularOffsets {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(varus_valgus: f32, flexion_extension: f32) -> Self {
        Self { varus_valgus, flexion_extension }
    }

    /// Both angles clamped to `[-limit, limit]`
    pub fn clamped(self, limit: f32) -> Self {
        Self::new(
            clamp_degrees(self.varus_valgus, limit),
            clamp_degrees(self.flexion_extension, limit),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.varus_valgus == 0.0 && self.flexion_extension == 0.0
    }

    /// Varus/valgus first, then flexion/extension
    pub fn rotation(&self) -> Quat {
        angular_offset_rotation(self.varus_valgus, self.flexion_extension)
    }

    pub fn apply(&self, normal: Vec3) -> Vec3 {
        self.rotation() * normal
    }
}

/// Clamp a slider value; NaN collapses to zero
pub fn clamp_degrees(value: f32, limit: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    let limit = limit.abs();
    value.clamp(-limit, limit)
}
