//! Per-operation handlers exposed to the presentation layer.

mod get_session;
mod send_message;
mod set_field;
mod start_session;

pub use get_session::{GetSessionError, GetSessionHandler, SessionView};
pub use send_message::{
    SendMessageCommand, SendMessageError, SendMessageHandler, SendMessageResult,
};
pub use set_field::{SetFieldCommand, SetFieldError, SetFieldHandler, SetFieldResult};
pub use start_session::{StartSessionError, StartSessionHandler, StartSessionResult};

use serde::Serialize;

use crate::domain::record::{evaluate, CaseRecord, TransitionPolicy};

/// Case-record completion status returned with every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordStatus {
    /// Number of set fields.
    pub filled: usize,
    /// Number of set critical fields.
    pub critical_filled: usize,
    /// Number of set additional fields.
    pub additional_filled: usize,
    /// Whether the record currently satisfies the transition criteria.
    pub should_transition: bool,
    /// Human-readable status enumerating what remains missing.
    pub status_message: String,
}

impl RecordStatus {
    /// Evaluates the record and captures its counts.
    pub fn of(record: &CaseRecord, policy: &TransitionPolicy) -> Self {
        let readiness = evaluate(record, policy);
        Self {
            filled: record.filled_count(),
            critical_filled: record.critical_filled_count(),
            additional_filled: record.additional_filled_count(),
            should_transition: readiness.should_transition,
            status_message: readiness.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FieldName;

    #[test]
    fn record_status_mirrors_evaluator() {
        let mut record = CaseRecord::new();
        record.set(FieldName::PatientAge, "34").unwrap();
        record.set(FieldName::PatientGender, "female").unwrap();

        let status = RecordStatus::of(&record, &TransitionPolicy::default());

        assert_eq!(status.filled, 2);
        assert_eq!(status.critical_filled, 1);
        assert_eq!(status.additional_filled, 1);
        assert!(!status.should_transition);
        assert!(status.status_message.contains("Context gathering"));
    }
}
