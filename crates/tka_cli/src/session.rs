//! Scripted planning sessions
//!
//! A session is a TOML list of user intents replayed in order against a
//! [`Planner`]:
//!
//! ```toml
//! [[step]]
//! action = "arm"
//! landmark = "Femur Center"
//!
//! [[step]]
//! action = "click"
//! x = 640.0
//! y = 360.0
//!
//! [[step]]
//! action = "perpendicular_plane"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tka_math::Vec3;
use tka_plan::{ClickOutcome, LandmarkKind, PlanSnapshot, Planner};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One user intent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Arm { landmark: LandmarkKind },
    Click { x: f32, y: f32 },
    /// Commit a known position without picking
    Place { landmark: LandmarkKind, position: [f32; 3] },
    VarusValgus { degrees: f32 },
    FlexionExtension { degrees: f32 },
    UpdateAxes,
    PerpendicularPlane,
    Resize { width: u32, height: u32 },
    ShowResection { visible: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Session {
    pub fn from_toml_str(content: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session = Self::from_toml_str(&content)?;
        log::info!("Loaded session {} ({} steps)", path.display(), session.steps.len());
        Ok(session)
    }
}

/// A step that failed; replay carries on after it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub message: String,
}

/// Tally of what a replay did
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub committed: usize,
    pub missed: usize,
    pub not_armed: usize,
    pub failures: Vec<StepFailure>,
}

impl ReplayReport {
    fn record_click(&mut self, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::Committed(_) => self.committed += 1,
            ClickOutcome::Missed => self.missed += 1,
            ClickOutcome::NotArmed => self.not_armed += 1,
        }
    }
}

/// Everything the driver prints
#[derive(Clone, Debug, Serialize)]
pub struct SessionOutput {
    pub report: ReplayReport,
    pub plan: PlanSnapshot,
}

/// Apply every step in order
pub fn replay(planner: &mut Planner, session: &Session) -> ReplayReport {
    let mut report = ReplayReport::default();

    for (index, step) in session.steps.iter().enumerate() {
        report.steps += 1;
        let result = match step {
            Step::Arm { landmark } => {
                planner.arm_landmark(*landmark);
                Ok(())
            }
            Step::Click { x, y } => {
                report.record_click(planner.click(*x, *y));
                Ok(())
            }
            Step::Place { landmark, position } => {
                report.record_click(planner.place(*landmark, Vec3::from_array(*position)));
                Ok(())
            }
            Step::VarusValgus { degrees } => planner.set_varus_valgus(*degrees).map(|_| ()),
            Step::FlexionExtension { degrees } => planner.set_flexion_extension(*degrees).map(|_| ()),
            Step::UpdateAxes => {
                planner.update_axes();
                Ok(())
            }
            Step::PerpendicularPlane => planner.create_perpendicular_plane().map(|_| ()),
            Step::Resize { width, height } => {
                planner.resize(*width, *height);
                Ok(())
            }
            Step::ShowResection { visible } => {
                planner.set_show_resection(*visible);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::warn!("Step {} ({:?}) failed: {}", index + 1, step, e);
            report.failures.push(StepFailure { step: index + 1, message: e.to_string() });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_action() {
        let session = Session::from_toml_str(
            r#"
            [[step]]
            action = "arm"
            landmark = "Hip Center"

            [[step]]
            action = "click"
            x = 10.0
            y = 20.5

            [[step]]
            action = "place"
            landmark = "Posterior Lateral Point"
            position = [1.0, 2.0, 3.0]

            [[step]]
            action = "varus_valgus"
            degrees = -4.0

            [[step]]
            action = "flexion_extension"
            degrees = 2.0

            [[step]]
            action = "update_axes"

            [[step]]
            action = "perpendicular_plane"

            [[step]]
            action = "resize"
            width = 800
            height = 600

            [[step]]
            action = "show_resection"
            visible = false
            "#,
        )
        .unwrap();

        assert_eq!(
            session.steps,
            vec![
                Step::Arm { landmark: LandmarkKind::HipCenter },
                Step::Click { x: 10.0, y: 20.5 },
                Step::Place { landmark: LandmarkKind::PosteriorLateralPoint, position: [1.0, 2.0, 3.0] },
                Step::VarusValgus { degrees: -4.0 },
                Step::FlexionExtension { degrees: 2.0 },
                Step::UpdateAxes,
                Step::PerpendicularPlane,
                Step::Resize { width: 800, height: 600 },
                Step::ShowResection { visible: false },
            ]
        );
    }

    #[test]
    fn test_unknown_landmark_rejected() {
        let err = Session::from_toml_str("[[step]]\naction = \"arm\"\nlandmark = \"Knee\"\n").unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
    }

    #[test]
    fn test_landmark_labels_are_lenient() {
        let session = Session::from_toml_str(
            "[[step]]\naction = \"arm\"\nlandmark = \"hip center\"\n\n\
             [[step]]\naction = \"place\"\nlandmark = \" FEMUR CENTER \"\nposition = [0.0, 0.0, 0.0]\n",
        )
        .unwrap();
        assert_eq!(
            session.steps,
            vec![
                Step::Arm { landmark: LandmarkKind::HipCenter },
                Step::Place { landmark: LandmarkKind::FemurCenter, position: [0.0, 0.0, 0.0] },
            ]
        );
    }

    #[test]
    fn test_empty_session() {
        assert!(Session::from_toml_str("").unwrap().steps.is_empty());
    }
}
