use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WebhookConfig;

/// Body POSTed to the workflow endpoint for every recognized expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRecord {
    pub name: String,
    pub item: String,
    pub price: f64,
    pub group_id: String,
    pub raw_text: String,
    pub timestamp_ms: i64,
}

/// What happened to a record handed to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Posted,
    /// No webhook URL configured
    Skipped,
    Failed,
}

pub struct WebhookClient {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.url.trim().is_empty()
    }

    pub async fn post(&self, record: &ExpenseRecord) -> Result<()> {
        let url = self.config.url.trim();

        debug!("Posting expense to webhook: {}", url);

        let response = self
            .client
            .post(url)
            .json(record)
            .send()
            .await
            .context("Failed to send request to webhook")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webhook error ({}): {}", status, error_body);
        }

        Ok(())
    }

    /// Post the record, downgrading any failure to `Delivery::Failed`.
    pub async fn deliver(&self, record: &ExpenseRecord) -> Delivery {
        if !self.is_configured() {
            info!("Webhook URL not set; skipping POST");
            return Delivery::Skipped;
        }

        match self.post(record).await {
            Ok(()) => {
                info!("Webhook POST ok");
                Delivery::Posted
            }
            Err(e) => {
                warn!("Webhook POST failed: {:#}", e);
                Delivery::Failed
            }
        }
    }
}
