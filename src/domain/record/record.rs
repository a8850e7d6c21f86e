//! The case record and the bulk-update patch applied by extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::foundation::DomainError;

use super::fields::FieldName;

/// The structured record of case facts gathered during intake.
///
/// # Invariants
///
/// - A field is either absent or holds a non-empty string.
/// - Fields are independently settable and overwritable; corrections are
///   allowed at any time, not just first-write.
///
/// Serializes to a flat map containing only the set fields, keyed by the
/// snake_case field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseRecord {
    fields: BTreeMap<FieldName, String>,
}

impl CaseRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field to a non-empty value, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the value is empty or whitespace-only
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) -> Result<(), DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::validation(
                field.as_str(),
                "Field value cannot be empty",
            ));
        }
        self.fields.insert(field, value);
        Ok(())
    }

    /// Sets a field addressed by its wire name.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if the name is not part of the schema
    /// - `ValidationFailed` if the value is empty or whitespace-only
    pub fn set_named(&mut self, name: &str, value: impl Into<String>) -> Result<(), DomainError> {
        let field = FieldName::from_str(name)?;
        self.set(field, value)
    }

    /// Returns the value of a field, if set.
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Returns true if the field is set.
    pub fn is_set(&self, field: FieldName) -> bool {
        self.fields.contains_key(&field)
    }

    /// Number of set fields.
    pub fn filled_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of set critical fields.
    pub fn critical_filled_count(&self) -> usize {
        self.fields.keys().filter(|f| f.is_critical()).count()
    }

    /// Number of set non-critical fields.
    pub fn additional_filled_count(&self) -> usize {
        self.filled_count() - self.critical_filled_count()
    }

    /// Merges an extraction patch into the record.
    ///
    /// Every patched field overwrites the current value (last-extraction
    /// wins, so corrections propagate); fields absent from the patch are
    /// left untouched: a patch never un-sets a previously known fact.
    ///
    /// Returns the number of fields written.
    pub fn apply_patch(&mut self, patch: &RecordPatch) -> usize {
        for (field, value) in &patch.updates {
            self.fields.insert(*field, value.clone());
        }
        patch.updates.len()
    }

    /// Iterates set fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

/// A best-effort bulk update produced by structured extraction.
///
/// Built tolerantly: unknown keys, non-string values, and empty strings are
/// dropped rather than rejected, so one malformed entry never discards the
/// rest of an extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    updates: BTreeMap<FieldName, String>,
}

impl RecordPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a patch from a JSON object returned by the extraction call.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut patch = Self::new();
        if let Some(object) = value.as_object() {
            for (key, value) in object {
                let Ok(field) = FieldName::from_str(key) else {
                    continue;
                };
                if let Some(text) = value.as_str() {
                    if !text.trim().is_empty() {
                        patch.updates.insert(field, text.to_string());
                    }
                }
            }
        }
        patch
    }

    /// Adds a field update to the patch. Empty values are ignored.
    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.updates.insert(field, value);
        }
        self
    }

    /// Returns true if the patch carries no updates.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of field updates in the patch.
    pub fn len(&self) -> usize {
        self.updates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod record_basics {
        use super::*;

        #[test]
        fn new_record_is_empty() {
            let record = CaseRecord::new();
            assert_eq!(record.filled_count(), 0);
            assert_eq!(record.critical_filled_count(), 0);
            assert_eq!(record.additional_filled_count(), 0);
        }

        #[test]
        fn set_and_get_round_trip() {
            let mut record = CaseRecord::new();
            record.set(FieldName::PatientAge, "34").unwrap();
            assert_eq!(record.get(FieldName::PatientAge), Some("34"));
            assert!(record.is_set(FieldName::PatientAge));
        }

        #[test]
        fn set_overwrites_previous_value() {
            let mut record = CaseRecord::new();
            record.set(FieldName::Diagnosis, "initial impression").unwrap();
            record.set(FieldName::Diagnosis, "revised diagnosis").unwrap();
            assert_eq!(record.get(FieldName::Diagnosis), Some("revised diagnosis"));
            assert_eq!(record.filled_count(), 1);
        }

        #[test]
        fn set_rejects_empty_value() {
            let mut record = CaseRecord::new();
            assert!(record.set(FieldName::PatientAge, "").is_err());
            assert!(record.set(FieldName::PatientAge, "   ").is_err());
            assert!(!record.is_set(FieldName::PatientAge));
        }

        #[test]
        fn set_named_resolves_wire_name() {
            let mut record = CaseRecord::new();
            record.set_named("patient_age", "34").unwrap();
            assert_eq!(record.get(FieldName::PatientAge), Some("34"));
        }

        #[test]
        fn set_named_reports_unknown_field() {
            let mut record = CaseRecord::new();
            let err = record.set_named("nonexistent", "x").unwrap_err();
            assert_eq!(
                err.details.get("field"),
                Some(&"nonexistent".to_string())
            );
            assert_eq!(record.filled_count(), 0);
        }
    }

    mod counts {
        use super::*;

        #[test]
        fn critical_and_additional_counts_split_correctly() {
            let mut record = CaseRecord::new();
            record.set(FieldName::TherapistRole, "OT").unwrap();
            record.set(FieldName::PatientAge, "34").unwrap();
            record.set(FieldName::PatientGender, "female").unwrap();
            record.set(FieldName::HobbiesLeisure, "swimming").unwrap();

            assert_eq!(record.filled_count(), 4);
            assert_eq!(record.critical_filled_count(), 2);
            assert_eq!(record.additional_filled_count(), 2);
        }
    }

    mod patches {
        use super::*;

        #[test]
        fn apply_patch_merges_values() {
            let mut record = CaseRecord::new();
            record.set(FieldName::TherapistRole, "Student").unwrap();

            let patch = RecordPatch::new()
                .with(FieldName::PatientAge, "7")
                .with(FieldName::Diagnosis, "DCD");

            assert_eq!(record.apply_patch(&patch), 2);
            assert_eq!(record.get(FieldName::TherapistRole), Some("Student"));
            assert_eq!(record.get(FieldName::PatientAge), Some("7"));
            assert_eq!(record.get(FieldName::Diagnosis), Some("DCD"));
        }

        #[test]
        fn apply_patch_overwrites_but_never_unsets() {
            let mut record = CaseRecord::new();
            record.set(FieldName::PatientAge, "7").unwrap();
            record.set(FieldName::Diagnosis, "DCD").unwrap();

            let patch = RecordPatch::new().with(FieldName::PatientAge, "8");
            record.apply_patch(&patch);

            assert_eq!(record.get(FieldName::PatientAge), Some("8"));
            assert_eq!(record.get(FieldName::Diagnosis), Some("DCD"));
        }

        #[test]
        fn from_json_keeps_known_non_empty_strings() {
            let value = serde_json::json!({
                "patient_age": "34",
                "diagnosis": "",
                "unknown_key": "ignored",
                "years_experience": null,
                "marital_status": 3,
            });

            let patch = RecordPatch::from_json(&value);
            assert_eq!(patch.len(), 1);

            let mut record = CaseRecord::new();
            record.apply_patch(&patch);
            assert_eq!(record.get(FieldName::PatientAge), Some("34"));
            assert!(!record.is_set(FieldName::Diagnosis));
        }

        #[test]
        fn from_json_on_non_object_is_empty() {
            assert!(RecordPatch::from_json(&serde_json::json!("text")).is_empty());
            assert!(RecordPatch::from_json(&serde_json::json!([1, 2])).is_empty());
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn serializes_set_fields_only_as_flat_map() {
            let mut record = CaseRecord::new();
            record.set(FieldName::PatientAge, "34").unwrap();
            record.set(FieldName::TherapistRole, "OT").unwrap();

            let json = serde_json::to_value(&record).unwrap();
            let object = json.as_object().unwrap();
            assert_eq!(object.len(), 2);
            assert_eq!(object["patient_age"], "34");
            assert_eq!(object["therapist_role"], "OT");
        }

        #[test]
        fn deserializes_from_flat_map() {
            let record: CaseRecord =
                serde_json::from_str(r#"{"patient_age":"34","diagnosis":"CVA"}"#).unwrap();
            assert_eq!(record.filled_count(), 2);
            assert_eq!(record.get(FieldName::Diagnosis), Some("CVA"));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_subset() -> impl Strategy<Value = Vec<FieldName>> {
            proptest::collection::vec(0usize..FieldName::ALL.len(), 0..18)
                .prop_map(|indices| {
                    let mut fields: Vec<FieldName> =
                        indices.into_iter().map(|i| FieldName::ALL[i]).collect();
                    fields.sort();
                    fields.dedup();
                    fields
                })
        }

        proptest! {
            #[test]
            fn filled_count_is_critical_plus_additional(fields in arb_subset()) {
                let mut record = CaseRecord::new();
                for field in &fields {
                    record.set(*field, "value").unwrap();
                }
                prop_assert_eq!(
                    record.filled_count(),
                    record.critical_filled_count() + record.additional_filled_count()
                );
                prop_assert_eq!(record.filled_count(), fields.len());
            }

            #[test]
            fn serde_round_trip_preserves_record(fields in arb_subset()) {
                let mut record = CaseRecord::new();
                for (i, field) in fields.iter().enumerate() {
                    record.set(*field, format!("value-{i}")).unwrap();
                }
                let json = serde_json::to_string(&record).unwrap();
                let restored: CaseRecord = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(record, restored);
            }
        }
    }
}
