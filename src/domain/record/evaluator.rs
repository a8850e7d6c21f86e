//! Completion evaluator: decides when the case record is complete enough
//! for the session to transition into the mentoring phase.

use super::fields::FieldName;
use super::record::CaseRecord;

/// Thresholds governing the intake-to-mentoring transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    /// Minimum number of set non-critical fields.
    pub additional_required: usize,
    /// Minimum number of set fields overall.
    pub min_total: usize,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            additional_required: 7,
            min_total: 12,
        }
    }
}

/// Outcome of evaluating a case record against the transition policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    /// True when the record satisfies every transition criterion.
    pub should_transition: bool,
    /// Human-readable status enumerating exactly what is still missing.
    pub message: String,
}

/// Evaluates whether the record is sufficiently complete for transition.
///
/// Criteria (all must hold): every critical field set, at least
/// `additional_required` additional fields set, and at least `min_total`
/// fields set overall. Pure and total: never fails, never mutates.
pub fn evaluate(record: &CaseRecord, policy: &TransitionPolicy) -> Readiness {
    let total_fields = FieldName::total_count();
    let total_critical = FieldName::critical_count();

    let filled = record.filled_count();
    let critical_filled = record.critical_filled_count();
    let additional_filled = record.additional_filled_count();

    let all_critical_filled = critical_filled == total_critical;
    let enough_additional = additional_filled >= policy.additional_required;
    let min_total_met = filled >= policy.min_total;

    let should_transition = all_critical_filled && enough_additional && min_total_met;

    let message = if should_transition {
        format!(
            "Context complete: {filled}/{total_fields} fields filled \
             ({critical_filled}/{total_critical} critical, {additional_filled} additional). \
             Ready for reference retrieval."
        )
    } else {
        let mut missing = Vec::new();
        if !all_critical_filled {
            missing.push(format!(
                "{} critical field(s)",
                total_critical - critical_filled
            ));
        }
        if !enough_additional {
            missing.push(format!(
                "need {} more additional field(s)",
                policy.additional_required - additional_filled
            ));
        }
        if missing.is_empty() {
            // Criticals and additionals are satisfied but the overall
            // minimum is higher than their sum.
            missing.push(format!("need {} more field(s)", policy.min_total - filled));
        }

        format!(
            "Context gathering: {filled}/{total_fields} fields filled \
             ({critical_filled}/{total_critical} critical, {additional_filled} additional). \
             Missing: {}.",
            missing.join(", ")
        )
    };

    Readiness {
        should_transition,
        message,
    }
}
