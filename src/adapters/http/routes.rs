//! HTTP routes for the session endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{get_session, send_message, set_field, start_session, MentorHandlers};

/// Creates the session router with all endpoints.
pub fn session_routes(handlers: MentorHandlers) -> Router {
    Router::new()
        .route("/", post(start_session))
        .route("/:id", get(get_session))
        .route("/:id/messages", post(send_message))
        .route("/:id/record/:field", put(set_field))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySessionStore, MockCompletionProvider, MockSimilaritySearch};
    use crate::application::handlers::{
        GetSessionHandler, SendMessageHandler, SetFieldHandler, StartSessionHandler,
    };
    use crate::application::{FieldExtractor, RetrievalOrchestrator};
    use crate::domain::record::TransitionPolicy;
    use std::sync::Arc;

    #[test]
    fn session_routes_compiles() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider = Arc::new(MockCompletionProvider::new());
        let search = Arc::new(MockSimilaritySearch::new());
        let policy = TransitionPolicy::default();

        let handlers = MentorHandlers::new(
            Arc::new(StartSessionHandler::new(store.clone(), provider.clone())),
            Arc::new(SendMessageHandler::new(
                store.clone(),
                provider.clone(),
                FieldExtractor::new(provider.clone()),
                RetrievalOrchestrator::new(search, 2),
                policy,
            )),
            Arc::new(SetFieldHandler::new(store.clone(), policy)),
            Arc::new(GetSessionHandler::new(store, policy)),
        );

        let _router = session_routes(handlers);
    }
}
