//! Case Mentor server binary.
//!
//! Loads configuration, wires the adapters to the application handlers,
//! and serves the session API.

use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use case_mentor::adapters::http::{session_routes, MentorHandlers};
use case_mentor::adapters::{
    ChromaConfig, ChromaSearch, FileSessionStore, GeminiConfig, GeminiProvider, GeminiEmbeddings,
};
use case_mentor::application::handlers::{
    GetSessionHandler, SendMessageHandler, SetFieldHandler, StartSessionHandler,
};
use case_mentor::application::{FieldExtractor, RetrievalOrchestrator};
use case_mentor::config::AppConfig;
use case_mentor::ports::{CompletionProvider, SessionStore, SimilaritySearch};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,case_mentor=debug")),
        )
        .init();

    // Configuration problems are fatal before any session processing.
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };
    if let Err(error) = config.validate() {
        tracing::error!(%error, "invalid configuration");
        std::process::exit(1);
    }

    let api_key = config.ai.google_api_key.clone().unwrap_or_default();

    let provider: Arc<dyn CompletionProvider> = Arc::new(GeminiProvider::new(
        GeminiConfig::new(api_key.clone())
            .with_model(config.ai.model.clone())
            .with_temperature(config.ai.temperature)
            .with_max_tokens(config.ai.max_tokens)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    ));

    let embeddings = GeminiEmbeddings::new(
        api_key,
        config.retrieval.embedding_model.clone(),
        config.retrieval.timeout(),
    );
    let search: Arc<dyn SimilaritySearch> = Arc::new(ChromaSearch::new(
        ChromaConfig::new(
            config.retrieval.base_url.clone(),
            config.retrieval.collection.clone(),
        )
        .with_timeout(config.retrieval.timeout()),
        embeddings,
    ));

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.sessions.path()));

    let policy = config.intake.policy();
    let handlers = MentorHandlers::new(
        Arc::new(StartSessionHandler::new(store.clone(), provider.clone())),
        Arc::new(SendMessageHandler::new(
            store.clone(),
            provider.clone(),
            FieldExtractor::new(provider.clone()),
            RetrievalOrchestrator::new(search, config.retrieval.top_k),
            policy,
        )),
        Arc::new(SetFieldHandler::new(store.clone(), policy)),
        Arc::new(GetSessionHandler::new(store, policy)),
    );

    let app = axum::Router::new()
        .nest("/api/sessions", session_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                ))),
        );

    let addr = config.server.socket_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind server address");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, model = %config.ai.model, "case-mentor listening");

    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server terminated");
        std::process::exit(1);
    }
}
