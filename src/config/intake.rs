//! Intake transition thresholds

use serde::Deserialize;

use crate::domain::record::{FieldName, TransitionPolicy};

use super::error::ValidationError;

/// Thresholds for the intake-to-mentoring transition
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Minimum number of set non-critical fields
    #[serde(default = "default_additional")]
    pub additional_fields_required: usize,

    /// Minimum number of set fields overall
    #[serde(default = "default_min_total")]
    pub min_total_fields: usize,
}

impl IntakeConfig {
    /// Convert into the domain transition policy
    pub fn policy(&self) -> TransitionPolicy {
        TransitionPolicy {
            additional_required: self.additional_fields_required,
            min_total: self.min_total_fields,
        }
    }

    /// Validate intake thresholds against the field schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        let total = FieldName::total_count();
        let additional_available = total - FieldName::critical_count();

        if self.additional_fields_required > additional_available
            || self.min_total_fields > total
        {
            return Err(ValidationError::InvalidIntakeThresholds);
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            additional_fields_required: default_additional(),
            min_total_fields: default_min_total(),
        }
    }
}

fn default_additional() -> usize {
    7
}

fn default_min_total() -> usize {
    12
}
