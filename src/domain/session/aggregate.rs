//! MentorSession - the aggregate root of a mentoring conversation.
//!
//! Holds the case record, the append-only message log, and the phase
//! transition marker. The application layer owns a working copy during a
//! single turn and writes the full aggregate back through the session
//! store at the end of the turn.

use crate::domain::conversation::{prompts, MessageRecord, Phase};
use crate::domain::foundation::{DomainError, SessionId, Timestamp};
use crate::domain::record::{evaluate, CaseRecord, Readiness, RecordPatch, TransitionPolicy};

use super::references::{ReferenceMetadata, RetrievedReference};

/// A mentoring session: case record, message log, phase marker, and
/// retrieved-reference metadata.
///
/// # Invariants
///
/// - The first two log entries are system messages (base prompt + intake
///   instructions), present before the first user turn.
/// - The message log is append-only.
/// - The transition happens at most once; once in `Mentoring` the session
///   never returns to `Intake`.
/// - The phase is derived from the transition timestamp alone.
#[derive(Debug, Clone, PartialEq)]
pub struct MentorSession {
    id: SessionId,
    created_at: Timestamp,
    model_id: Option<String>,
    record: CaseRecord,
    messages: Vec<MessageRecord>,
    phase_transition_at: Option<Timestamp>,
    references: Vec<ReferenceMetadata>,
}

impl MentorSession {
    /// Creates a new session seeded with the base prompt and the intake
    /// instructions.
    pub fn new(id: SessionId) -> Self {
        let messages = vec![
            MessageRecord::system(prompts::BASE_SYSTEM_PROMPT)
                .expect("base prompt is non-empty"),
            MessageRecord::system(prompts::INTAKE_INSTRUCTIONS)
                .expect("intake instructions are non-empty"),
        ];

        Self {
            id,
            created_at: Timestamp::now(),
            model_id: None,
            record: CaseRecord::new(),
            messages,
            phase_transition_at: None,
            references: Vec::new(),
        }
    }

    /// Reconstitutes a session from persistence (no validation).
    pub fn reconstitute(
        id: SessionId,
        created_at: Timestamp,
        model_id: Option<String>,
        record: CaseRecord,
        messages: Vec<MessageRecord>,
        phase_transition_at: Option<Timestamp>,
        references: Vec<ReferenceMetadata>,
    ) -> Self {
        Self {
            id,
            created_at,
            model_id,
            record,
            messages,
            phase_transition_at,
            references,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Completion-service model in effect when the session was last saved.
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn record(&self) -> &CaseRecord {
        &self.record
    }

    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    /// Current phase, derived solely from the transition marker.
    pub fn phase(&self) -> Phase {
        Phase::from_transition_marker(self.phase_transition_at.as_ref())
    }

    pub fn phase_transition_at(&self) -> Option<&Timestamp> {
        self.phase_transition_at.as_ref()
    }

    pub fn has_transitioned(&self) -> bool {
        self.phase_transition_at.is_some()
    }

    /// Metadata of the references retrieved at transition time.
    pub fn references(&self) -> &[ReferenceMetadata] {
        &self.references
    }

    // ─────────────────────────────────────────────────────────────────────
    // Per-turn operations
    // ─────────────────────────────────────────────────────────────────────

    /// Appends a user message to the log.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        self.messages.push(MessageRecord::user(content)?);
        Ok(())
    }

    /// Appends an assistant message to the log.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        self.messages.push(MessageRecord::assistant(content)?);
        Ok(())
    }

    /// The user/assistant transcript, excluding system scaffolding, in
    /// order. This is the extraction input: instructions must not be
    /// re-ingested as case facts.
    pub fn non_system_messages(&self) -> Vec<MessageRecord> {
        self.messages
            .iter()
            .filter(|m| !m.role().is_system())
            .cloned()
            .collect()
    }

    /// Merges an extraction patch into the case record.
    pub fn apply_patch(&mut self, patch: &RecordPatch) -> usize {
        self.record.apply_patch(patch)
    }

    /// Explicit, authoritative field update addressed by wire name.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), DomainError> {
        self.record.set_named(name, value)
    }

    /// Evaluates the case record against the transition policy.
    pub fn readiness(&self, policy: &TransitionPolicy) -> Readiness {
        evaluate(&self.record, policy)
    }

    /// Stamps the completion-service model identifier before saving.
    pub fn set_model_id(&mut self, model_id: impl Into<String>) {
        self.model_id = Some(model_id.into());
    }

    /// Applies the one-time intake-to-mentoring transition.
    ///
    /// Appends exactly two system messages (mentoring instructions + the
    /// reference payload), records the reference metadata, and stamps the
    /// transition timestamp.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session has already transitioned
    pub fn apply_transition(
        &mut self,
        retrieved: &[RetrievedReference],
    ) -> Result<(), DomainError> {
        if self.has_transitioned() {
            return Err(DomainError::invalid_transition(
                "Session has already transitioned to the mentoring phase",
            ));
        }

        self.messages.push(
            MessageRecord::system(prompts::MENTORING_INSTRUCTIONS)
                .expect("mentoring instructions are non-empty"),
        );
        self.messages.push(
            MessageRecord::system(prompts::reference_context_message(retrieved))
                .expect("reference payload is non-empty"),
        );

        self.references = retrieved.iter().map(RetrievedReference::metadata).collect();
        self.phase_transition_at = Some(Timestamp::now());

        Ok(())
    }
}
