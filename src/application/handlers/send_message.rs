//! SendMessageHandler - processes one user turn of the mentoring dialogue.
//!
//! This is the per-turn orchestration: append the user message, generate
//! the assistant reply, and while the session is in intake run extraction,
//! evaluate the record, and apply the one-time transition when the record
//! is complete. The full aggregate is persisted once at the end of the
//! turn.

use std::sync::Arc;

use crate::application::{FieldExtractor, RetrievalOrchestrator};
use crate::domain::conversation::Phase;
use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::record::{case_summary, TransitionPolicy};
use crate::domain::session::RetrievedReference;
use crate::ports::{
    CompletionError, CompletionProvider, CompletionRequest, SessionStore, SessionStoreError,
};

use super::RecordStatus;

/// Command to process one user turn.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub message: String,
}

/// Result of a processed turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    /// Assistant response text.
    pub response: String,
    /// Phase after the turn.
    pub phase: Phase,
    /// True when this turn performed the intake-to-mentoring transition.
    pub transitioned: bool,
    /// References retrieved by this turn's transition, if it happened.
    pub references: Option<Vec<RetrievedReference>>,
    /// Case-record completion status after the turn.
    pub record_status: RecordStatus,
}

/// Errors that fail the whole turn. None of these leaves partial state
/// behind: the aggregate is only persisted after every fallible step has
/// succeeded.
#[derive(Debug, thiserror::Error)]
pub enum SendMessageError {
    /// The primary chat completion failed; the user message is not yet
    /// durably answered.
    #[error("completion service failed: {0}")]
    Completion(#[from] CompletionError),

    /// The session store could not be read or written.
    #[error("session persistence failed: {0}")]
    Store(#[from] SessionStoreError),

    /// The command violated a domain invariant (e.g. empty message).
    #[error("{0}")]
    Domain(#[from] DomainError),
}

/// Handler for processing user turns.
pub struct SendMessageHandler {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn CompletionProvider>,
    extractor: FieldExtractor,
    retrieval: RetrievalOrchestrator,
    policy: TransitionPolicy,
}

impl SendMessageHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn CompletionProvider>,
        extractor: FieldExtractor,
        retrieval: RetrievalOrchestrator,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            extractor,
            retrieval,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendMessageCommand,
    ) -> Result<SendMessageResult, SendMessageError> {
        // 1. Load the aggregate (a fresh id yields a seeded empty session).
        let mut session = self.store.load(cmd.session_id).await?;

        // 2. Append the user message and generate the assistant reply. The
        //    completion call happens in every phase; the model conditions
        //    its behavior on the system instructions already in the log.
        session.push_user(cmd.message)?;
        let completion = self
            .provider
            .complete(CompletionRequest::new(session.messages().to_vec()))
            .await?;
        session.push_assistant(&completion.content)?;

        // 3. While in intake: re-extract fields, evaluate the record, and
        //    transition at most once per turn.
        let mut transitioned = false;
        let mut references = None;

        if session.phase() == Phase::Intake {
            self.extractor.refresh(&mut session).await;

            let readiness = session.readiness(&self.policy);
            if readiness.should_transition {
                let summary = case_summary(session.record());
                match self.retrieval.retrieve(&summary).await {
                    Ok(retrieved) => {
                        session.apply_transition(&retrieved)?;
                        tracing::info!(
                            session_id = %session.id(),
                            references = retrieved.len(),
                            "session transitioned to the mentoring phase"
                        );
                        transitioned = true;
                        references = Some(retrieved);
                    }
                    Err(error) => {
                        // The turn itself still succeeds; the transition is
                        // retried on a later turn once the evaluator again
                        // signals readiness.
                        tracing::warn!(
                            session_id = %session.id(),
                            %error,
                            "reference retrieval failed; session remains in intake"
                        );
                    }
                }
            }
        }

        // 4. Persist the full aggregate.
        session.set_model_id(completion.model);
        self.store.save(&session).await?;

        Ok(SendMessageResult {
            response: completion.content,
            phase: session.phase(),
            transitioned,
            references,
            record_status: RecordStatus::of(session.record(), &self.policy),
        })
    }
}
