//! Error types for rate limit parsing and rule loading.

use thiserror::Error;

/// Main error type for limiter operations.
#[derive(Error, Debug)]
pub enum LimiterError {
    /// The period command is not `<int>-<unit>` or the unit is unknown
    #[error("Invalid period command format: {command:?}")]
    Format { command: String },

    /// The numeric part of the period command is not positive
    #[error("Period command count must be greater than 0: {command:?}")]
    Command { command: String },

    /// The request limit is not positive
    #[error("Limit must be greater than 0, got {limit}")]
    Limit { limit: i64 },

    /// The method is not one of the recognized HTTP methods
    #[error("Unsupported HTTP method: {method:?}")]
    Method { method: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LimiterError {
    /// Whether this error came from validating a single rate definition.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            LimiterError::Format { .. }
                | LimiterError::Command { .. }
                | LimiterError::Limit { .. }
                | LimiterError::Method { .. }
        )
    }
}

impl From<config::ConfigError> for LimiterError {
    fn from(err: config::ConfigError) -> Self {
        LimiterError::Config(err.to_string())
    }
}

/// Result type alias for limiter operations.
pub type Result<T> = std::result::Result<T, LimiterError>;
