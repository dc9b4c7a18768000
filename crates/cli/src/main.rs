mod cli;
mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use episub_core::{load_config_or_default, validate_config, Database, Dispatcher, JsonFileStore};

use cli::Cli;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!(store = ?config.store.path, client = %config.download.client, "Configuration loaded");

    let store = Arc::new(JsonFileStore::new(&config.store.path));
    let dispatcher = Dispatcher::from_config(&config.download);
    let mut db = Database::open(store, dispatcher)
        .with_context(|| format!("Failed to open database {:?}", config.store.path))?;

    commands::execute(cli.command, &mut db, &config, cli.json).await
}
