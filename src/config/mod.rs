//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `CASE_MENTOR` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use case_mentor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod intake;
mod retrieval;
mod server;
mod sessions;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use retrieval::RetrievalConfig;
pub use server::ServerConfig;
pub use sessions::SessionsConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Validation failures are fatal at startup: no session may be processed
/// with an incomplete configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, request timeout)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion-service configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Similarity-search configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Intake transition thresholds
    #[serde(default)]
    pub intake: IntakeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `CASE_MENTOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CASE_MENTOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CASE_MENTOR__AI__GOOGLE_API_KEY=...` -> `ai.google_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CASE_MENTOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid,
    /// including a missing completion-service credential.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.retrieval.validate()?;
        self.sessions.validate()?;
        self.intake.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("CASE_MENTOR__AI__GOOGLE_API_KEY", "test-key");
    }

    fn clear_env() {
        env::remove_var("CASE_MENTOR__AI__GOOGLE_API_KEY");
        env::remove_var("CASE_MENTOR__SERVER__PORT");
        env::remove_var("CASE_MENTOR__RETRIEVAL__TOP_K");
        env::remove_var("CASE_MENTOR__SESSIONS__DIR");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.google_api_key.as_deref(), Some("test-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.sessions.dir, "./sessions");
        assert_eq!(config.intake.min_total_fields, 12);
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("GOOGLE_API_KEY"))
        ));
    }

    #[test]
    fn test_custom_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CASE_MENTOR__SERVER__PORT", "3000");
        env::set_var("CASE_MENTOR__RETRIEVAL__TOP_K", "5");
        env::set_var("CASE_MENTOR__SESSIONS__DIR", "/var/mentor/sessions");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.sessions.dir, "/var/mentor/sessions");
    }
}
