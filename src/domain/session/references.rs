//! Retrieved reference cases and their durable metadata.

use serde::{Deserialize, Serialize};

/// A reference case returned by similarity search at transition time.
///
/// Computed exactly once per session and thereafter immutable. The full
/// text lives only inside the phase-2 system message appended to the log;
/// the durable session record keeps [`ReferenceMetadata`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedReference {
    /// Identifier from the reference corpus.
    pub id: String,
    /// Reference title.
    pub title: String,
    /// Full reference text.
    pub content: String,
    /// Similarity score as reported by the search collaborator. The score
    /// convention is provider-defined; callers must not assume sign.
    pub score: f32,
}

impl RetrievedReference {
    /// Returns the content-free metadata persisted with the session.
    pub fn metadata(&self) -> ReferenceMetadata {
        ReferenceMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            score: self.score,
        }
    }
}

/// Durable, content-free record of a retrieved reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    pub id: String,
    pub title: String,
    pub score: f32,
}
