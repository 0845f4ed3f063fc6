use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{HomeworkApi, HomeworkPoller, TelegramNotifier},
    config::{BotConfig, Cli},
    domain::Cursor,
    logging::init_logging,
    result::Result,
};

pub struct AppComponents {
    pub poller: HomeworkPoller<TelegramNotifier>,
    pub once: bool,
    pub _log_guard: WorkerGuard,
}

pub fn initialize_app(cli: &Cli) -> Result<AppComponents> {
    let logging = cli.logging_config();
    let log_guard = init_logging(&logging)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %logging.log_path().display(),
        "Homework bot starting up"
    );

    let config = load_config(cli)?;
    let poller = create_poller(&config)?;

    Ok(AppComponents {
        poller,
        once: config.once,
        _log_guard: log_guard,
    })
}

/// Resolve the bot configuration, logging startup failures as critical
fn load_config(cli: &Cli) -> Result<BotConfig> {
    let config = BotConfig::from_cli(cli).inspect_err(|e| {
        tracing::error!(critical = e.is_fatal(), kind = e.kind(), "{e}. The bot is stopped.");
    })?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

fn create_poller(config: &BotConfig) -> Result<HomeworkPoller<TelegramNotifier>> {
    let api = HomeworkApi::new(config.client.clone())?;
    let notifier = TelegramNotifier::new(config.telegram.clone())?;

    Ok(HomeworkPoller::new(
        api,
        notifier,
        config.client.polling.clone(),
        Cursor::now(),
    ))
}
