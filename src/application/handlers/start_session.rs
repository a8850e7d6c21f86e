//! StartSessionHandler - creates a new durable mentoring session.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::session::MentorSession;
use crate::ports::{CompletionProvider, SessionStore, SessionStoreError};

/// Result of creating a session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session_id: SessionId,
}

/// Errors when creating a session.
#[derive(Debug, thiserror::Error)]
pub enum StartSessionError {
    #[error("session persistence failed: {0}")]
    Store(#[from] SessionStoreError),
}

/// Handler for creating sessions.
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// Creates, persists, and returns a new seeded session.
    pub async fn handle(&self) -> Result<StartSessionResult, StartSessionError> {
        let mut session = MentorSession::new(SessionId::new());
        session.set_model_id(self.provider.provider_info().model);

        self.store.save(&session).await?;

        tracing::info!(session_id = %session.id(), "session created");

        Ok(StartSessionResult {
            session_id: session.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySessionStore, MockCompletionProvider};
    use crate::domain::conversation::Phase;

    #[tokio::test]
    async fn creates_and_persists_seeded_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider = Arc::new(MockCompletionProvider::new());
        let handler = StartSessionHandler::new(store.clone(), provider);

        let result = handler.handle().await.unwrap();

        let session = store.load(result.session_id).await.unwrap();
        assert_eq!(session.phase(), Phase::Intake);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.model_id(), Some("mock-model-1"));
    }

    #[tokio::test]
    async fn each_call_creates_a_distinct_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider = Arc::new(MockCompletionProvider::new());
        let handler = StartSessionHandler::new(store, provider);

        let first = handler.handle().await.unwrap();
        let second = handler.handle().await.unwrap();
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(InMemorySessionStore::new());
        store.fail_saves(true);
        let provider = Arc::new(MockCompletionProvider::new());
        let handler = StartSessionHandler::new(store, provider);

        assert!(matches!(
            handler.handle().await,
            Err(StartSessionError::Store(_))
        ));
    }
}
