// src/main.rs
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use jobboard::cli::{handle_command, JobBoardCli};
use jobboard::{ClientConfig, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = JobBoardCli::parse();
    let config = ClientConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if config.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    debug!("Directory service: {}", config.api_url);
    debug!("Identity service: {}", config.identity_url());

    let session = Session::load(&config.token_path())?.on_session_expired(|| {
        eprintln!("Your session has expired. Run `jobboard login` to sign in again.");
    });

    handle_command(cli.command, &config, Arc::new(session)).await
}
