//! GetSessionHandler - read-only session view for resume and status.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::conversation::{MessageRecord, Phase};
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::record::TransitionPolicy;
use crate::domain::session::ReferenceMetadata;
use crate::ports::{SessionStore, SessionStoreError};

use super::RecordStatus;

/// Read model of a session.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub id: SessionId,
    pub created_at: Timestamp,
    pub phase: Phase,
    pub phase_transition_at: Option<Timestamp>,
    pub model_id: Option<String>,
    pub messages: Vec<MessageRecord>,
    pub references: Vec<ReferenceMetadata>,
    pub record: BTreeMap<String, String>,
    pub record_status: RecordStatus,
}

/// Errors when reading a session.
#[derive(Debug, thiserror::Error)]
pub enum GetSessionError {
    #[error("session persistence failed: {0}")]
    Store(#[from] SessionStoreError),
}

/// Handler for reading session state.
pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
    policy: TransitionPolicy,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Loads the session view. Side-effect-free: repeated calls observe
    /// identical state until the next processed turn.
    pub async fn handle(&self, session_id: SessionId) -> Result<SessionView, GetSessionError> {
        let session = self.store.load(session_id).await?;

        let record = session
            .record()
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value.to_string()))
            .collect();

        Ok(SessionView {
            id: session.id(),
            created_at: *session.created_at(),
            phase: session.phase(),
            phase_transition_at: session.phase_transition_at().copied(),
            model_id: session.model_id().map(str::to_string),
            messages: session.messages().to_vec(),
            references: session.references().to_vec(),
            record,
            record_status: RecordStatus::of(session.record(), &self.policy),
        })
    }
}
