//! Field definitions for the case record.
//!
//! The 18 fields, their categories, and their critical markers are fixed at
//! compile time. Field order is canonical: therapist profile, patient
//! profile, treatment context, then the dilemma. Everything that depends on
//! field ordering (summary generation, persistence, the extraction schema)
//! derives it from the declaration order here.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::DomainError;

/// Category a case-record field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Therapist,
    Patient,
    Treatment,
    Dilemma,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 4] = [
        Category::Therapist,
        Category::Patient,
        Category::Treatment,
        Category::Dilemma,
    ];

    /// Human-readable label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Therapist => "Therapist Profile",
            Category::Patient => "Patient Profile",
            Category::Treatment => "Treatment Context",
            Category::Dilemma => "The Dilemma",
        }
    }
}

/// A named field of the case record.
///
/// Declaration order is the canonical field order; `Ord` follows it, so
/// ordered collections keyed by `FieldName` iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    // Therapist Profile
    TherapistRole,
    YearsExperience,
    AreaSpecialization,
    TherapistSetting,

    // Patient Profile
    PatientAge,
    PatientGender,
    Diagnosis,
    CulturalBackground,
    MaritalStatus,
    EducationalFramework,
    OccupationalFramework,
    HobbiesLeisure,

    // Treatment Context
    TreatmentSetting,
    DurationAcquaintance,
    TreatmentType,

    // The Dilemma
    MainDifficulty,
    RelatedBehaviors,
    ImpactDailyFunction,
}

/// Name-to-field lookup table, built once.
static FIELDS_BY_NAME: Lazy<HashMap<&'static str, FieldName>> =
    Lazy::new(|| FieldName::ALL.iter().map(|f| (f.as_str(), *f)).collect());

impl FieldName {
    /// All fields in canonical order.
    pub const ALL: [FieldName; 18] = [
        FieldName::TherapistRole,
        FieldName::YearsExperience,
        FieldName::AreaSpecialization,
        FieldName::TherapistSetting,
        FieldName::PatientAge,
        FieldName::PatientGender,
        FieldName::Diagnosis,
        FieldName::CulturalBackground,
        FieldName::MaritalStatus,
        FieldName::EducationalFramework,
        FieldName::OccupationalFramework,
        FieldName::HobbiesLeisure,
        FieldName::TreatmentSetting,
        FieldName::DurationAcquaintance,
        FieldName::TreatmentType,
        FieldName::MainDifficulty,
        FieldName::RelatedBehaviors,
        FieldName::ImpactDailyFunction,
    ];

    /// Returns the snake_case wire name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::TherapistRole => "therapist_role",
            FieldName::YearsExperience => "years_experience",
            FieldName::AreaSpecialization => "area_specialization",
            FieldName::TherapistSetting => "therapist_setting",
            FieldName::PatientAge => "patient_age",
            FieldName::PatientGender => "patient_gender",
            FieldName::Diagnosis => "diagnosis",
            FieldName::CulturalBackground => "cultural_background",
            FieldName::MaritalStatus => "marital_status",
            FieldName::EducationalFramework => "educational_framework",
            FieldName::OccupationalFramework => "occupational_framework",
            FieldName::HobbiesLeisure => "hobbies_leisure",
            FieldName::TreatmentSetting => "treatment_setting",
            FieldName::DurationAcquaintance => "duration_acquaintance",
            FieldName::TreatmentType => "treatment_type",
            FieldName::MainDifficulty => "main_difficulty",
            FieldName::RelatedBehaviors => "related_behaviors",
            FieldName::ImpactDailyFunction => "impact_daily_function",
        }
    }

    /// Returns the category this field belongs to.
    pub fn category(&self) -> Category {
        match self {
            FieldName::TherapistRole
            | FieldName::YearsExperience
            | FieldName::AreaSpecialization
            | FieldName::TherapistSetting => Category::Therapist,

            FieldName::PatientAge
            | FieldName::PatientGender
            | FieldName::Diagnosis
            | FieldName::CulturalBackground
            | FieldName::MaritalStatus
            | FieldName::EducationalFramework
            | FieldName::OccupationalFramework
            | FieldName::HobbiesLeisure => Category::Patient,

            FieldName::TreatmentSetting
            | FieldName::DurationAcquaintance
            | FieldName::TreatmentType => Category::Treatment,

            FieldName::MainDifficulty
            | FieldName::RelatedBehaviors
            | FieldName::ImpactDailyFunction => Category::Dilemma,
        }
    }

    /// Returns true if this field must be set before the mentoring
    /// transition is possible.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            FieldName::TherapistRole
                | FieldName::PatientAge
                | FieldName::Diagnosis
                | FieldName::CulturalBackground
                | FieldName::MaritalStatus
        )
    }

    /// Number of critical fields in the schema.
    pub fn critical_count() -> usize {
        Self::ALL.iter().filter(|f| f.is_critical()).count()
    }

    /// Total number of fields in the schema.
    pub fn total_count() -> usize {
        Self::ALL.len()
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELDS_BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| DomainError::unknown_field(s))
    }
}

/// JSON schema for structured field extraction: one nullable string per
/// case-record field, no required properties.
pub fn extraction_schema() -> serde_json::Value {
    let properties: serde_json::Map<String, serde_json::Value> = FieldName::ALL
        .iter()
        .map(|field| {
            (
                field.as_str().to_string(),
                serde_json::json!({ "type": "string", "nullable": true }),
            )
        })
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
    })
}
