mod bridge;
mod config;
mod expense;
mod health;
mod platform;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bridge::Bridge;
use crate::config::Config;
use crate::webhook::WebhookClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,expensebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Group: {}", config.telegram.group_id);
    if config.webhook.url.trim().is_empty() {
        info!("  Webhook: not set, expenses will only be confirmed in chat");
    } else {
        info!("  Webhook: {}", config.webhook.url);
    }
    info!(
        "  Health server: {}:{}",
        config.server.bind_address, config.server.port
    );

    // Health endpoint runs alongside the bot for the lifetime of the process
    let server_config = config.server.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(&server_config).await {
            error!("Health server stopped: {:#}", e);
        }
    });

    let webhook = WebhookClient::new(config.webhook.clone())?;
    let bridge = Arc::new(Bridge::new(webhook));
    let bot = Bot::new(&config.telegram.bot_token);

    info!("Bot is starting...");
    platform::telegram::run(bridge, config.telegram.group_id, bot).await?;

    Ok(())
}
