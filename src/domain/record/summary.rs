//! Natural-language case summary used as the retrieval query.

use super::fields::FieldName;
use super::record::CaseRecord;

/// Builds a deterministic natural-language summary of the set fields,
/// grouped therapist, patient, treatment, dilemma in canonical field order.
///
/// The summary is the similarity-search query text, so the output for a
/// given record must never vary between runs.
pub fn case_summary(record: &CaseRecord) -> String {
    let mut parts = Vec::new();

    // Therapist profile, folded into one clause.
    if let Some(role) = record.get(FieldName::TherapistRole) {
        let mut clause = format!("Therapist: {role}");
        if let Some(years) = record.get(FieldName::YearsExperience) {
            clause.push_str(&format!(", {years} experience"));
        }
        if let Some(specialization) = record.get(FieldName::AreaSpecialization) {
            clause.push_str(&format!(", specializing in {specialization}"));
        }
        if let Some(setting) = record.get(FieldName::TherapistSetting) {
            clause.push_str(&format!(" working in {setting}"));
        }
        parts.push(clause);
    }

    // Patient profile.
    let mut patient = Vec::new();
    if let Some(age) = record.get(FieldName::PatientAge) {
        patient.push(format!("{age} year old"));
    }
    if let Some(gender) = record.get(FieldName::PatientGender) {
        patient.push(gender.to_string());
    }
    if !patient.is_empty() {
        parts.push(format!("Patient: {}", patient.join(" ")));
    }
    push_labeled(&mut parts, record, FieldName::Diagnosis, "Diagnosis");
    push_labeled(
        &mut parts,
        record,
        FieldName::CulturalBackground,
        "Cultural background",
    );
    push_labeled(&mut parts, record, FieldName::MaritalStatus, "Family structure");
    push_labeled(
        &mut parts,
        record,
        FieldName::EducationalFramework,
        "Educational framework",
    );
    push_labeled(
        &mut parts,
        record,
        FieldName::OccupationalFramework,
        "Occupational framework",
    );
    push_labeled(&mut parts, record, FieldName::HobbiesLeisure, "Hobbies and leisure");

    // Treatment context.
    push_labeled(&mut parts, record, FieldName::TreatmentSetting, "Setting");
    push_labeled(
        &mut parts,
        record,
        FieldName::DurationAcquaintance,
        "Duration of acquaintance",
    );
    push_labeled(&mut parts, record, FieldName::TreatmentType, "Treatment type");

    // The dilemma.
    push_labeled(&mut parts, record, FieldName::MainDifficulty, "Main challenge");
    push_labeled(
        &mut parts,
        record,
        FieldName::RelatedBehaviors,
        "Related behaviors",
    );
    push_labeled(
        &mut parts,
        record,
        FieldName::ImpactDailyFunction,
        "Impact on daily function",
    );

    parts.join("\n")
}

fn push_labeled(parts: &mut Vec<String>, record: &CaseRecord, field: FieldName, label: &str) {
    if let Some(value) = record.get(field) {
        parts.push(format!("{label}: {value}"));
    }
}
