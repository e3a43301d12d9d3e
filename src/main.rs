// src/main.rs
// Firebase MCP server entry point

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from current directory
    let _ = dotenvy::dotenv();

    let config = Cli::parse().into_config();

    // stdout carries the stdio protocol, so logs go to stderr
    let log_level = if config.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let validation = config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("{}", err);
        }
        std::process::exit(1);
    }

    info!("Starting Firebase MCP Server");
    info!("Credentials: {}", config.credentials.display());
    info!("Transport: {:?}", config.transport);

    if let Err(e) = cli::run_server(config).await {
        error!("Failed to start server: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
