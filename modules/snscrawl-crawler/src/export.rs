//! Crawl result exporters: a local JSON document (always) and a spreadsheet
//! webhook (opt-in, failure downgraded to a warning by the caller).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use snscrawl_common::{CrawlResult, Platform};

/// `data/threads_20250807_143022.json` style path.
pub fn default_output_path(data_dir: &Path, platform: Platform, at: DateTime<Utc>) -> PathBuf {
    data_dir.join(format!("{}_{}.json", platform, at.format("%Y%m%d_%H%M%S")))
}

pub fn write_json(result: &CrawlResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result).context("Failed to serialize crawl result")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        path = %path.display(),
        posts = result.metadata.total_posts,
        "Crawl result written"
    );
    Ok(())
}

/// Acknowledgment the spreadsheet webhook returns.
#[derive(Debug, Deserialize)]
struct WebhookAck {
    #[serde(default)]
    success: bool,
    #[serde(rename = "sheetUrl")]
    sheet_url: Option<String>,
    error: Option<String>,
}

pub struct WebhookExporter {
    client: reqwest::Client,
    url: String,
}

impl WebhookExporter {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            url: url.to_string(),
        }
    }

    /// POST the crawl result; returns the sheet URL when the webhook reports
    /// one. Errors here are for the caller to log; the local file is
    /// already on disk.
    pub async fn export(&self, result: &CrawlResult) -> Result<Option<String>> {
        info!(
            platform = %result.metadata.platform,
            posts = result.metadata.total_posts,
            "Uploading crawl result to webhook"
        );

        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(result)
            .send()
            .await
            .context("Webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Webhook returned status {status}: {body}");
        }

        let ack: WebhookAck = resp
            .json()
            .await
            .context("Webhook acknowledgment was not valid JSON")?;
        if !ack.success {
            anyhow::bail!(
                "Webhook rejected the payload: {}",
                ack.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }

        info!(sheet_url = ack.sheet_url.as_deref().unwrap_or("n/a"), "Webhook export complete");
        Ok(ack.sheet_url)
    }
}
