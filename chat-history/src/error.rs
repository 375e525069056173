//! Error handling for chat-history

use thiserror::Error;

use crate::history::ValidationError;

/// Result type alias for chat-history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Main error type for the chat-history library.
///
/// The conversation store itself never fails; these errors come from
/// configuration loading and the JSON helpers on [`crate::models::Message`].
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
    /// A message failed structural validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    LoadFailed(#[from] config::ConfigError),
}

/// Serialization/deserialization errors
#[derive(Debug, Error)]
pub enum SerializationError {
    /// JSON serialization or deserialization failed
    #[error("JSON serialization failed: {details}")]
    Json { details: String },
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Serialization(SerializationError::Json {
            details: err.to_string(),
        })
    }
}

impl From<config::ConfigError> for HistoryError {
    fn from(err: config::ConfigError) -> Self {
        HistoryError::Config(ConfigError::LoadFailed(err))
    }
}

impl HistoryError {
    /// Reason code of the wrapped validation failure, if any.
    pub fn validation_code(&self) -> Option<&'static str> {
        match self {
            HistoryError::Validation(err) => Some(err.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let err: HistoryError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            HistoryError::Serialization(SerializationError::Json { .. })
        ));
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = HistoryError::from(ValidationError::ToolCallMissingType { index: 2 });
        assert_eq!(
            err.to_string(),
            "Validation error: tool call at index 2 must have a type"
        );
        assert_eq!(err.validation_code(), Some("ToolCallMissingType"));
    }
}
