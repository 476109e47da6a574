//! Anatomical landmarks and the registry that captures them
//!
//! Capturing is a two-step protocol: a landmark name is *armed*, then the next
//! committed position is stored under that name and the armed name is cleared.
//! Entries are append-only. Re-capturing a name appends another entry, and
//! [`LandmarkRegistry::find`] keeps returning the first one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tka_math::Vec3;

use crate::error::PlanError;

/// The fixed set of landmark labels a user can capture
///
/// Serialized as its display label. Deserialization goes through [`FromStr`],
/// so it is as lenient as typed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum LandmarkKind {
    #[serde(rename = "Femur Center")]
    FemurCenter,
    #[serde(rename = "Hip Center")]
    HipCenter,
    #[serde(rename = "Femur Proximal Canal")]
    FemurProximalCanal,
    #[serde(rename = "Femur Distal Canal")]
    FemurDistalCanal,
    #[serde(rename = "Medial Epicondyle")]
    MedialEpicondyle,
    #[serde(rename = "Lateral Epicondyle")]
    LateralEpicondyle,
    #[serde(rename = "Distal Medial Point")]
    DistalMedialPoint,
    #[serde(rename = "Distal Lateral Point")]
    DistalLateralPoint,
    #[serde(rename = "Posterior Medial Point")]
    PosteriorMedialPoint,
    #[serde(rename = "Posterior Lateral Point")]
    PosteriorLateralPoint,
}

impl LandmarkKind {
    /// All labels, in the order they are offered to the user
    pub const ALL: [LandmarkKind; 10] = [
        LandmarkKind::FemurCenter,
        LandmarkKind::HipCenter,
        LandmarkKind::FemurProximalCanal,
        LandmarkKind::FemurDistalCanal,
        LandmarkKind::MedialEpicondyle,
        LandmarkKind::LateralEpicondyle,
        LandmarkKind::DistalMedialPoint,
        LandmarkKind::DistalLateralPoint,
        LandmarkKind::PosteriorMedialPoint,
        LandmarkKind::PosteriorLateralPoint,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            LandmarkKind::FemurCenter => "Femur Center",
            LandmarkKind::HipCenter => "Hip Center",
            LandmarkKind::FemurProximalCanal => "Femur Proximal Canal",
            LandmarkKind::FemurDistalCanal => "Femur Distal Canal",
            LandmarkKind::MedialEpicondyle => "Medial Epicondyle",
            LandmarkKind::LateralEpicondyle => "Lateral Epicondyle",
            LandmarkKind::DistalMedialPoint => "Distal Medial Point",
            LandmarkKind::DistalLateralPoint => "Distal Lateral Point",
            LandmarkKind::PosteriorMedialPoint => "Posterior Medial Point",
            LandmarkKind::PosteriorLateralPoint => "Posterior Lateral Point",
        }
    }
}

impl fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LandmarkKind {
    type Err = PlanError;

    /// Accepts the exact label, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LandmarkKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PlanError::UnknownLandmark(s.to_string()))
    }
}

impl TryFrom<String> for LandmarkKind {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A captured landmark
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: LandmarkKind,
    pub position: Vec3,
}

impl Landmark {
    pub fn new(name: LandmarkKind, position: Vec3) -> Self {
        Self { name, position }
    }
}

/// Result of [`LandmarkRegistry::commit`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommitOutcome {
    /// The position was stored under the armed name
    Committed(Landmark),
    /// No name was armed; nothing changed
    NothingArmed,
}

impl CommitOutcome {
    pub fn landmark(&self) -> Option<&Landmark> {
        match self {
            CommitOutcome::Committed(landmark) => Some(landmark),
            CommitOutcome::NothingArmed => None,
        }
    }
}

/// Ordered, append-only landmark store with at most one armed name
#[derive(Clone, Debug, Default)]
pub struct LandmarkRegistry {
    entries: Vec<Landmark>,
    armed: Option<LandmarkKind>,
}

impl LandmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `name` for the next commit, returning the previously armed name
    pub fn arm(&mut self, name: LandmarkKind) -> Option<LandmarkKind> {
        self.armed.replace(name)
    }

    /// Clear the armed name without committing
    pub fn disarm(&mut self) -> Option<LandmarkKind> {
        self.armed.take()
    }

    pub fn armed(&self) -> Option<LandmarkKind> {
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Store `position` under the armed name and clear it
    pub fn commit(&mut self, position: Vec3) -> CommitOutcome {
        match self.armed.take() {
            Some(name) => {
                let landmark = Landmark::new(name, position);
                self.entries.push(landmark);
                CommitOutcome::Committed(landmark)
            }
            None => CommitOutcome::NothingArmed,
        }
    }

    /// First stored entry for `name`
    pub fn find(&self, name: LandmarkKind) -> Option<&Landmark> {
        self.entries.iter().find(|l| l.name == name)
    }

    /// Every stored entry for `name`, oldest first
    pub fn find_all(&self, name: LandmarkKind) -> impl Iterator<Item = &Landmark> {
        self.entries.iter().filter(move |l| l.name == name)
    }

    pub fn contains(&self, name: LandmarkKind) -> bool {
        self.find(name).is_some()
    }

    /// Entries in capture order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for kind in LandmarkKind::ALL {
            assert_eq!(kind.label().parse::<LandmarkKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.label());
        }
        assert_eq!("  hip center ".parse::<LandmarkKind>().unwrap(), LandmarkKind::HipCenter);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = "Knee Center".parse::<LandmarkKind>().unwrap_err();
        assert!(matches!(err, PlanError::UnknownLandmark(ref name) if name == "Knee Center"));
    }

    #[test]
    fn test_serde_uses_labels_and_lenient_parsing() {
        assert_eq!(serde_json::to_string(&LandmarkKind::HipCenter).unwrap(), "\"Hip Center\"");

        let kind: LandmarkKind = serde_json::from_str("\"  hip center \"").unwrap();
        assert_eq!(kind, LandmarkKind::HipCenter);
        for kind in LandmarkKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(serde_json::from_str::<LandmarkKind>(&json).unwrap(), kind);
        }

        let err = serde_json::from_str::<LandmarkKind>("\"Knee Center\"").unwrap_err();
        assert!(err.to_string().contains("Knee Center"));
    }

    #[test]
    fn test_commit_requires_armed_name() {
        let mut registry = LandmarkRegistry::new();
        assert_eq!(registry.commit(Vec3::ONE), CommitOutcome::NothingArmed);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_commit_stores_and_disarms() {
        let mut registry = LandmarkRegistry::new();
        registry.arm(LandmarkKind::FemurCenter);

        let outcome = registry.commit(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            outcome,
            CommitOutcome::Committed(Landmark::new(LandmarkKind::FemurCenter, Vec3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(registry.armed(), None);
        assert_eq!(registry.len(), 1);

        // A second commit without re-arming does nothing
        assert_eq!(registry.commit(Vec3::ZERO), CommitOutcome::NothingArmed);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rearming_replaces_armed_name() {
        let mut registry = LandmarkRegistry::new();
        assert_eq!(registry.arm(LandmarkKind::HipCenter), None);
        assert_eq!(registry.arm(LandmarkKind::MedialEpicondyle), Some(LandmarkKind::HipCenter));

        registry.commit(Vec3::X);
        assert!(registry.contains(LandmarkKind::MedialEpicondyle));
        assert!(!registry.contains(LandmarkKind::HipCenter));
    }

    #[test]
    fn test_find_returns_first_of_duplicates() {
        let mut registry = LandmarkRegistry::new();
        registry.arm(LandmarkKind::HipCenter);
        registry.commit(Vec3::new(0.0, 100.0, 0.0));
        registry.arm(LandmarkKind::HipCenter);
        registry.commit(Vec3::new(0.0, 200.0, 0.0));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find(LandmarkKind::HipCenter).unwrap().position, Vec3::new(0.0, 100.0, 0.0));
        assert_eq!(registry.find_all(LandmarkKind::HipCenter).count(), 2);
        assert!(registry.find(LandmarkKind::FemurCenter).is_none());
    }

    #[test]
    fn test_disarm() {
        let mut registry = LandmarkRegistry::new();
        registry.arm(LandmarkKind::LateralEpicondyle);
        assert_eq!(registry.disarm(), Some(LandmarkKind::LateralEpicondyle));
        assert_eq!(registry.commit(Vec3::ZERO), CommitOutcome::NothingArmed);
    }
}
