//! Error types for zone triggers

use crate::filter::FilterMode;
use std::fmt;
use thiserror::Error;

/// Which name pattern a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    ZoneName,
    EntityName,
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneName => f.write_str("zone name"),
            Self::EntityName => f.write_str("entity name"),
        }
    }
}

/// Trigger configuration errors
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Pattern is not a valid regular expression
    #[error("Invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: PatternField,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Name filter is enabled without a pattern
    #[error("{field} filter is set to {mode:?} but no pattern was given")]
    MissingPattern { field: PatternField, mode: FilterMode },
}

/// Result type for trigger configuration
pub type Result<T> = std::result::Result<T, TriggerError>;
