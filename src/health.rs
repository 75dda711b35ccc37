//! Liveness endpoint for hosting platforms that ping the service.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tracing::info;

use crate::config::ServerConfig;

async fn index() -> &'static str {
    "Expense bridge running."
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
}

/// Bind and serve until the process exits.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("HTTP server on {}", addr);

    axum::serve(listener, router())
        .await
        .context("Server error")?;

    Ok(())
}
