//! Ports: trait boundaries to the external collaborators.
//!
//! The completion service, the similarity-search service, and session
//! persistence are reached exclusively through these traits; adapters
//! provide the concrete implementations.

mod completion;
mod session_store;
mod similarity;

pub use completion::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, ExtractionRequest,
    FinishReason, ProviderInfo, TokenUsage,
};
pub use session_store::{SessionStore, SessionStoreError};
pub use similarity::{RetrievalError, ScoredDocument, SimilaritySearch};
