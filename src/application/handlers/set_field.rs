//! SetFieldHandler - explicit, authoritative case-record updates.
//!
//! The manual override next to the best-effort extractor: the caller names
//! a field and a value, the record is updated and persisted, and the
//! completion evaluator is re-run for the returned status.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::record::TransitionPolicy;
use crate::ports::{SessionStore, SessionStoreError};

use super::RecordStatus;

/// Command to set one case-record field by wire name.
#[derive(Debug, Clone)]
pub struct SetFieldCommand {
    pub session_id: SessionId,
    pub field: String,
    pub value: String,
}

/// Result of a field update.
///
/// An unknown field name or an invalid value is reported here rather than
/// raised: `success` is false and `error` explains why, with nothing
/// persisted.
#[derive(Debug, Clone)]
pub struct SetFieldResult {
    pub success: bool,
    pub error: Option<String>,
    /// Present after a successful update: the re-evaluated record status.
    pub record_status: Option<RecordStatus>,
}

/// Errors that fail the operation outright (as opposed to a reported
/// unknown-field condition).
#[derive(Debug, thiserror::Error)]
pub enum SetFieldError {
    #[error("session persistence failed: {0}")]
    Store(#[from] SessionStoreError),
}

/// Handler for manual field updates.
pub struct SetFieldHandler {
    store: Arc<dyn SessionStore>,
    policy: TransitionPolicy,
}

impl SetFieldHandler {
    pub fn new(store: Arc<dyn SessionStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn handle(&self, cmd: SetFieldCommand) -> Result<SetFieldResult, SetFieldError> {
        let mut session = self.store.load(cmd.session_id).await?;

        if let Err(error) = session.set_field(&cmd.field, &cmd.value) {
            tracing::debug!(
                session_id = %session.id(),
                field = %cmd.field,
                %error,
                "field update rejected"
            );
            return Ok(SetFieldResult {
                success: false,
                error: Some(error.message),
                record_status: None,
            });
        }

        self.store.save(&session).await?;

        Ok(SetFieldResult {
            success: true,
            error: None,
            record_status: Some(RecordStatus::of(session.record(), &self.policy)),
        })
    }
}
