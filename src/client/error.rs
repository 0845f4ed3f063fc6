//! Error types for the homework API and Telegram clients

use compact_str::CompactString;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure: connection refused, timeout, DNS and the like
    #[error("Failed to reach the API endpoint: {0}")]
    Request(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("API responded with unexpected status")]
    Response { status: StatusCode },

    #[error("API response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to deliver message: {0}")]
    Delivery(CompactString),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidation {
        field: CompactString,
        message: CompactString,
    },
}

impl ClientError {
    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    pub fn delivery(message: impl Into<CompactString>) -> Self {
        Self::Delivery(message.into())
    }

    /// Status code of a rejected response, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response { status } => Some(*status),
            Self::Request(e) | Self::Http(e) => e.status(),
            _ => None,
        }
    }
}
