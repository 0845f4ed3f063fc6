//! Telegram Bot API notifier

use compact_str::{CompactString, format_compact};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{
    config::TelegramConfig,
    error::{ClientError, Result},
};
use crate::id::ChatId;

/// Delivers notification text somewhere a human will read it.
///
/// Implementations never fail: delivery problems are logged and dropped so
/// the poll loop keeps running.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, message: &str);
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<CompactString>,
}

#[derive(Debug)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().build().map_err(ClientError::Http)?;
        Ok(Self { client, config })
    }

    /// Send `text` to the configured chat
    #[instrument(skip(self, text), fields(chat_id = %self.config.chat_id))]
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest { chat_id: &self.config.chat_id, text };

        let response = self
            .client
            .post(self.config.send_message_url().as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::delivery(format_compact!("{}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::delivery(format_compact!("{}", e.without_url())))?;

        match serde_json::from_str::<BotApiResponse>(&body) {
            Ok(BotApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Ok(BotApiResponse { description, .. }) => Err(ClientError::delivery(format_compact!(
                "HTTP {}: {}",
                status.as_u16(),
                description.unwrap_or_default()
            ))),
            Err(_) => Err(ClientError::delivery(format_compact!(
                "HTTP {}: unexpected Bot API response",
                status.as_u16()
            ))),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        match self.send_message(message).await {
            Ok(()) => debug!(chat_id = %self.config.chat_id, "Message sent"),
            Err(e) => error!(error = %e, chat_id = %self.config.chat_id, "Failed to send message"),
        }
    }
}
