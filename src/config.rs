use std::{fmt, path::PathBuf, time::Duration};

use clap::Parser;
use compact_str::CompactString;
use tracing::Level;

use crate::{
    client::config::{
        ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TELEGRAM_API_URL, PollingConfig, RequestConfig,
        TelegramConfig,
    },
    id::ChatId,
    logging::{DEFAULT_LOG_FILE, LoggingConfig},
    result::{BotError, Result},
};

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Relay homework review status changes to a Telegram chat
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// OAuth token for the homework API
    #[arg(long, env = PRACTICUM_TOKEN, hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token
    #[arg(long, env = TELEGRAM_TOKEN, hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Chat that receives notifications
    #[arg(long, env = TELEGRAM_CHAT_ID, hide_env_values = true)]
    pub telegram_chat_id: Option<String>,

    /// Homework statuses endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Telegram Bot API base URL
    #[arg(long, default_value = DEFAULT_TELEGRAM_API_URL)]
    pub telegram_api_url: String,

    /// Seconds to wait between two polls
    #[arg(long, default_value_t = 600)]
    pub retry_period_secs: u64,

    /// Timeout for homework API requests; no timeout when omitted
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Query from the server's last reported time instead of the start time
    #[arg(long)]
    pub advance_cursor: bool,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Directory for the log file
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value_t = Level::DEBUG)]
    pub log_level: Level,

    /// Write the log file as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

/// The three secrets the bot cannot run without
#[derive(Clone)]
pub struct Credentials {
    pub api_token: CompactString,
    pub bot_token: CompactString,
    pub chat_id: ChatId,
}

impl Credentials {
    /// Fails with every missing or empty variable named
    pub fn new(
        api_token: Option<&str>,
        bot_token: Option<&str>,
        chat_id: Option<&str>,
    ) -> Result<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        let pairs = [
            (PRACTICUM_TOKEN, present(api_token)),
            (TELEGRAM_TOKEN, present(bot_token)),
            (TELEGRAM_CHAT_ID, present(chat_id)),
        ];
        let names: Vec<&'static str> = pairs
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        match pairs {
            [(_, Some(api_token)), (_, Some(bot_token)), (_, Some(chat_id))] => Ok(Self {
                api_token: api_token.into(),
                bot_token: bot_token.into(),
                chat_id: ChatId::new(chat_id),
            }),
            _ => Err(BotError::ConfigMissing { names }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"***")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Everything the poll loop needs, resolved from CLI flags and environment
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub client: ClientConfig,
    pub telegram: TelegramConfig,
    pub once: bool,
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            log_dir: self.log_dir.clone(),
            file_name: DEFAULT_LOG_FILE.to_string(),
            level: self.log_level,
            json: self.json_logs,
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(
            self.practicum_token.as_deref(),
            self.telegram_token.as_deref(),
            self.telegram_chat_id.as_deref(),
        )
    }
}

impl BotConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let credentials = cli.credentials()?;

        let client = ClientConfig::new(cli.endpoint.as_str(), credentials.api_token)
            .with_polling(PollingConfig {
                retry_period: Duration::from_secs(cli.retry_period_secs),
                advance_cursor: cli.advance_cursor,
            })
            .with_request(RequestConfig {
                timeout: cli.request_timeout_secs.map(Duration::from_secs),
            });
        client.validate()?;

        let telegram = TelegramConfig::new(credentials.bot_token, credentials.chat_id)
            .with_api_url(cli.telegram_api_url.as_str());
        telegram.validate()?;

        Ok(Self { client, telegram, once: cli.once })
    }
}
