//! Adapters: concrete implementations of the ports.

pub mod ai;
pub mod http;
pub mod retrieval;
pub mod session;

pub use ai::{GeminiConfig, GeminiProvider, MockCompletionProvider};
pub use retrieval::{ChromaConfig, ChromaSearch, GeminiEmbeddings, MockSimilaritySearch};
pub use session::{FileSessionStore, InMemorySessionStore};
