//! Error types for EPR Client

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while configuring or driving the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// A configuration value could not be used
    #[error("Invalid configuration for {key}: '{value}' ({reason})")]
    Config {
        key: String,
        value: String,
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ClientError::Config {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
