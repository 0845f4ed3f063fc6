use compact_str::CompactString;
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Missing required environment variables: {}", names.join(", "))]
    ConfigMissing { names: Vec<&'static str> },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Unexpected response type: {0}")]
    UnexpectedType(CompactString),

    #[error("Missing key in API response: {0}")]
    MissingKey(CompactString),

    #[error("No homework in the API response")]
    EmptyResult,

    #[error("Unknown homework status: {0}")]
    UnknownStatus(CompactString),

    #[error("Failed to initialize logging: {0}")]
    Logging(CompactString),
}

impl BotError {
    pub fn unexpected_type(message: impl Into<CompactString>) -> Self {
        Self::UnexpectedType(message.into())
    }

    pub fn missing_key(key: impl Into<CompactString>) -> Self {
        Self::MissingKey(key.into())
    }

    pub fn unknown_status(status: impl Into<CompactString>) -> Self {
        Self::UnknownStatus(status.into())
    }

    /// Stable label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::ConfigMissing { .. } => "config_missing",
            BotError::Client(e) => match e {
                ClientError::Request(_) => "request",
                ClientError::Response { .. } => "response",
                ClientError::Decode(_) => "decode",
                ClientError::Delivery(_) => "delivery",
                ClientError::Http(_) => "http_client",
                ClientError::ConfigValidation { .. } => "config_validation",
            },
            BotError::UnexpectedType(_) => "unexpected_type",
            BotError::MissingKey(_) => "missing_key",
            BotError::EmptyResult => "empty_result",
            BotError::UnknownStatus(_) => "unknown_status",
            BotError::Logging(_) => "logging",
        }
    }

    /// Errors that must stop the process instead of being retried next cycle
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::ConfigMissing { .. }
                | BotError::Logging(_)
                | BotError::Client(ClientError::Http(_) | ClientError::ConfigValidation { .. })
        )
    }
}
