//! Sandbox errors

use thiserror::Error;
use zone_triggers::TriggerError;

#[derive(Debug, Error)]
pub enum SandboxError {
    /// Scenario file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension is neither `.toml` nor `.json`
    #[error("Unsupported scenario format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    #[error("Entity {entity} has no collider #{index}")]
    ColliderOutOfRange { entity: String, index: usize },

    /// Rule configuration was rejected
    #[error("Rule '{rule}': {source}")]
    Rule {
        rule: String,
        #[source]
        source: TriggerError,
    },
}

pub type Result<T> = std::result::Result<T, SandboxError>;
