//! Mock completion provider for testing.
//!
//! Queued responses, error injection, and call tracking, so tests run
//! without calling a real model API.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_reply("Tell me more.")
//!     .with_patch(RecordPatch::new().with(FieldName::PatientAge, "34"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::record::RecordPatch;
use crate::ports::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, ExtractionRequest,
    FinishReason, ProviderInfo, TokenUsage,
};

/// Mock completion provider.
///
/// Completions and extractions are served from separate queues in FIFO
/// order; an empty queue yields a benign default (a fixed reply, an empty
/// patch) so multi-turn tests only script the turns they care about.
#[derive(Clone)]
pub struct MockCompletionProvider {
    completions: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    extractions: Arc<Mutex<VecDeque<Result<RecordPatch, CompletionError>>>>,
    completion_calls: Arc<Mutex<Vec<CompletionRequest>>>,
    extraction_calls: Arc<Mutex<Vec<ExtractionRequest>>>,
    model: String,
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    /// Creates a new mock provider with empty queues.
    pub fn new() -> Self {
        Self {
            completions: Arc::new(Mutex::new(VecDeque::new())),
            extractions: Arc::new(Mutex::new(VecDeque::new())),
            completion_calls: Arc::new(Mutex::new(Vec::new())),
            extraction_calls: Arc::new(Mutex::new(Vec::new())),
            model: "mock-model-1".to_string(),
        }
    }

    /// Queues a successful completion.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(Ok(content.into()));
        self
    }

    /// Queues a completion failure.
    pub fn with_completion_error(self, error: CompletionError) -> Self {
        self.completions.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queues a successful extraction result.
    pub fn with_patch(self, patch: RecordPatch) -> Self {
        self.extractions.lock().unwrap().push_back(Ok(patch));
        self
    }

    /// Queues an extraction failure.
    pub fn with_extraction_error(self, error: CompletionError) -> Self {
        self.extractions.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets the reported model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Completion requests received so far.
    pub fn completion_calls(&self) -> Vec<CompletionRequest> {
        self.completion_calls.lock().unwrap().clone()
    }

    /// Extraction requests received so far.
    pub fn extraction_calls(&self) -> Vec<ExtractionRequest> {
        self.extraction_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.completion_calls.lock().unwrap().push(request);

        let next = self.completions.lock().unwrap().pop_front();
        let content = match next {
            Some(result) => result?,
            None => "Understood. Please go on.".to_string(),
        };

        Ok(CompletionResponse {
            content,
            model: self.model.clone(),
            usage: TokenUsage::new(10, 20),
            finish_reason: FinishReason::Stop,
        })
    }

    async fn extract_record(
        &self,
        request: ExtractionRequest,
    ) -> Result<RecordPatch, CompletionError> {
        self.extraction_calls.lock().unwrap().push(request);

        match self.extractions.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(RecordPatch::new()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", self.model.clone())
    }
}
