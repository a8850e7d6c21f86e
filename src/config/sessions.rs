//! Session persistence configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Directory holding per-session state
    #[serde(default = "default_dir")]
    pub dir: String,
}

impl SessionsConfig {
    /// Sessions directory as a path
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }

    /// Validate session persistence configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dir.trim().is_empty() {
            return Err(ValidationError::InvalidSessionsDir);
        }
        Ok(())
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> String {
    "./sessions".to_string()
}
