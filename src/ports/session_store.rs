//! Session store port - durable persistence of the session aggregate.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::session::MentorSession;

/// Port for loading and saving session aggregates.
///
/// `save` writes the complete aggregate once per processed turn; there is
/// no incremental persistence. Implementations must be atomic with respect
/// to partial writes: either the full aggregate becomes durable or the
/// prior version remains readable.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the aggregate for the given id.
    ///
    /// A fresh id for which nothing has been persisted yields a new
    /// empty-but-valid session, not an error; loading is side-effect-free
    /// either way. Errors are reserved for unreadable or corrupt state.
    async fn load(&self, id: SessionId) -> Result<MentorSession, SessionStoreError>;

    /// Durably writes the full aggregate.
    async fn save(&self, session: &MentorSession) -> Result<(), SessionStoreError>;
}

/// Session persistence errors. Fatal for the turn in which they occur.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionStoreError {
    /// Underlying IO failure.
    #[error("session store io error: {0}")]
    Io(String),

    /// Stored state exists but cannot be decoded.
    #[error("session record corrupt: {0}")]
    Corrupt(String),

    /// The aggregate could not be encoded.
    #[error("session record serialization failed: {0}")]
    Serialization(String),
}
