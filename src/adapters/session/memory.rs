//! In-memory session store for tests and handler wiring.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::foundation::SessionId;
use crate::domain::session::MentorSession;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory store keyed by session id.
///
/// Saves can be switched to fail for exercising persistence-failure paths.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, MentorSession>>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Returns true if nothing has been saved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<MentorSession, SessionStoreError> {
        let sessions = self.sessions.read().unwrap();
        Ok(sessions
            .get(&id)
            .cloned()
            .unwrap_or_else(|| MentorSession::new(id)))
    }

    async fn save(&self, session: &MentorSession) -> Result<(), SessionStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SessionStoreError::Io("simulated write failure".to_string()));
        }
        self.sessions
            .write()
            .unwrap()
            .insert(session.id(), session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemorySessionStore::new();
        let mut session = MentorSession::new(SessionId::new());
        session.push_user("Hello").unwrap();

        store.save(&session).await.unwrap();
        let loaded = store.load(session.id()).await.unwrap();

        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn unknown_id_yields_fresh_session() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();

        let session = store.load(id).await.unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.messages().len(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failing_saves_return_io_error() {
        let store = InMemorySessionStore::new();
        store.fail_saves(true);

        let session = MentorSession::new(SessionId::new());
        assert!(matches!(
            store.save(&session).await,
            Err(SessionStoreError::Io(_))
        ));

        store.fail_saves(false);
        assert!(store.save(&session).await.is_ok());
    }
}
