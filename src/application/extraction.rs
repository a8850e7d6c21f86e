//! Field extraction: best-effort structured population of the case record
//! from the conversation transcript.

use std::sync::Arc;

use crate::domain::session::MentorSession;
use crate::ports::{CompletionProvider, ExtractionRequest};

/// Runs structured extraction over a session's transcript and merges the
/// result into its case record.
///
/// Extraction is strictly best-effort: any completion-service failure
/// (transport, malformed output, schema validation) is caught here, leaves
/// the record unchanged for the turn, and will simply be retried on the
/// next turn.
#[derive(Clone)]
pub struct FieldExtractor {
    provider: Arc<dyn CompletionProvider>,
}

impl FieldExtractor {
    /// Creates an extractor backed by the given provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Re-extracts fields from the full user/assistant transcript and
    /// merges them into the record (last-extraction-wins).
    ///
    /// Returns the number of fields written; 0 when extraction failed or
    /// produced nothing new.
    pub async fn refresh(&self, session: &mut MentorSession) -> usize {
        let request = ExtractionRequest::new(session.non_system_messages());

        match self.provider.extract_record(request).await {
            Ok(patch) => {
                let written = session.apply_patch(&patch);
                tracing::debug!(
                    session_id = %session.id(),
                    fields_written = written,
                    filled = session.record().filled_count(),
                    "field extraction merged"
                );
                written
            }
            Err(error) => {
                tracing::warn!(
                    session_id = %session.id(),
                    %error,
                    "field extraction failed; case record left unchanged"
                );
                0
            }
        }
    }
}
