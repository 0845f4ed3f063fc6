//! Dual-sink logging: a persistent log file plus live stdout

use std::path::{Path, PathBuf};

use compact_str::format_compact;
use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::result::{BotError, Result};

pub const DEFAULT_LOG_FILE: &str = "main.log";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub file_name: String,
    /// Used when `RUST_LOG` is not set
    pub level: Level,
    /// Write the file sink as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            file_name: DEFAULT_LOG_FILE.to_string(),
            level: Level::DEBUG,
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

/// Install the global subscriber. The returned guard flushes the file sink
/// on drop and must live as long as the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let appender = file_appender(&config.log_dir, &config.file_name)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = if config.json {
        fmt::layer().json().with_writer(file_writer).boxed()
    } else {
        fmt::layer().with_ansi(false).with_writer(file_writer).boxed()
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
        .try_init()
        .map_err(|e| BotError::Logging(format_compact!("{e}")))?;

    Ok(guard)
}

fn file_appender(log_dir: &Path, file_name: &str) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        BotError::Logging(format_compact!("cannot create {}: {e}", log_dir.display()))
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .map_err(|e| BotError::Logging(format_compact!("cannot open log file: {e}")))
}
