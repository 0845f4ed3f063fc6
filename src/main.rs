mod app_init;
mod client;
mod config;
mod domain;
mod id;
mod logging;
mod notice_service;
mod result;

use clap::Parser;

use crate::{app_init::initialize_app, config::Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine, the environment may already be set
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut app = initialize_app(&cli)?;

    if app.once {
        app.poller.poll_once().await;
        tracing::info!("Single poll finished");
        return Ok(());
    }

    app.poller.run().await;
    Ok(())
}
