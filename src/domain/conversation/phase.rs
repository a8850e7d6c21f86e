//! Session phases.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// The phase a mentoring session is in.
///
/// Phases are monotonic: once a session reaches `Mentoring` it never
/// returns to `Intake`. The phase is derived solely from whether a
/// transition timestamp has been recorded, so resume is deterministic even
/// if the case record later changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Gathering case context through conversation.
    Intake,
    /// Reflective mentoring grounded in retrieved references.
    Mentoring,
}

impl Phase {
    /// Derives the phase from the persisted transition marker.
    pub fn from_transition_marker(marker: Option<&Timestamp>) -> Self {
        if marker.is_some() {
            Self::Mentoring
        } else {
            Self::Intake
        }
    }

    /// Returns a label for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Intake => "Context Gathering",
            Self::Mentoring => "Reflective Mentoring",
        }
    }

    /// Returns true while the session is still gathering context.
    pub fn is_intake(&self) -> bool {
        matches!(self, Self::Intake)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_marker_means_intake() {
        assert_eq!(Phase::from_transition_marker(None), Phase::Intake);
    }

    #[test]
    fn marker_means_mentoring() {
        let ts = Timestamp::now();
        assert_eq!(Phase::from_transition_marker(Some(&ts)), Phase::Mentoring);
    }

    #[test]
    fn serializes_to_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Intake).unwrap(), "\"INTAKE\"");
        assert_eq!(
            serde_json::to_string(&Phase::Mentoring).unwrap(),
            "\"MENTORING\""
        );
    }

    #[test]
    fn labels_are_non_empty() {
        assert!(!Phase::Intake.label().is_empty());
        assert!(!Phase::Mentoring.label().is_empty());
    }
}
