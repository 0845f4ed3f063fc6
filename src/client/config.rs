//! Configuration for the homework API and Telegram clients

use std::{fmt, time::Duration};

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::id::ChatId;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);

/// Main configuration for the homework API client
#[derive(Clone)]
pub struct ClientConfig {
    /// Homework statuses endpoint
    pub endpoint: CompactString,
    /// OAuth token for the homework API
    pub api_token: CompactString,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
}

/// Poll loop cadence
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Sleep between two poll cycles
    pub retry_period: Duration,
    /// Move the cursor to the server's `current_date` after each decoded response
    pub advance_cursor: bool,
}

/// HTTP request configuration
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Request timeout; `None` leaves the HTTP client default in place
    pub timeout: Option<Duration>,
}

/// Telegram Bot API configuration
#[derive(Clone)]
pub struct TelegramConfig {
    pub api_url: CompactString,
    pub bot_token: CompactString,
    pub chat_id: ChatId,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            retry_period: DEFAULT_RETRY_PERIOD,
            advance_cursor: false,
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(endpoint: impl Into<CompactString>, api_token: impl Into<CompactString>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_http_url("endpoint", &self.endpoint)?;

        if self.api_token.is_empty() {
            return Err(ClientError::config_validation(
                "api_token",
                "API token cannot be empty",
            ));
        }

        if self.polling.retry_period.is_zero() {
            return Err(ClientError::config_validation(
                "retry_period",
                "Retry period must be greater than zero",
            ));
        }

        if self.request.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Set polling configuration
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<CompactString>, chat_id: ChatId) -> Self {
        Self {
            api_url: DEFAULT_TELEGRAM_API_URL.into(),
            bot_token: bot_token.into(),
            chat_id,
        }
    }

    /// Point the client at another Bot API host
    pub fn with_api_url(mut self, api_url: impl Into<CompactString>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_http_url("telegram_api_url", &self.api_url)?;

        if self.bot_token.is_empty() {
            return Err(ClientError::config_validation(
                "bot_token",
                "Bot token cannot be empty",
            ));
        }

        Ok(())
    }

    pub fn send_message_url(&self) -> CompactString {
        compact_str::format_compact!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::config_validation(field, "URL cannot be empty"));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ClientError::config_validation(
            field,
            "URL must start with http:// or https://",
        ));
    }

    if url::Url::parse(value).is_err() {
        return Err(ClientError::config_validation(
            field,
            "URL is not a valid URL format",
        ));
    }

    Ok(())
}

// Tokens stay out of logs
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"***")
            .field("polling", &self.polling)
            .field("request", &self.request)
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
