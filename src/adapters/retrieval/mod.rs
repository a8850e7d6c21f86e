//! Similarity-search adapters.

mod chroma;
mod embeddings;
mod mock;

pub use chroma::{ChromaConfig, ChromaSearch};
pub use embeddings::GeminiEmbeddings;
pub use mock::MockSimilaritySearch;
