//! Discord webhook notifications for ingest runs.

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::pipeline::RunSummary;
use crate::report::FailureReport;

const USERNAME: &str = "Geonames Cities";
const SUCCESS_COLOR: u32 = 0x00FF00;
const FAILURE_COLOR: u32 = 0xFF0000;
/// Upper bound on one notification, so a stalled endpoint cannot hold up a run
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize, Debug, PartialEq)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
}

#[derive(Serialize, Debug, PartialEq)]
struct DiscordPayload {
    username: String,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordPayload {
    fn new(title: &str, description: String, success: bool, timestamp: String) -> Self {
        Self {
            username: USERNAME.to_string(),
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description,
                color: if success { SUCCESS_COLOR } else { FAILURE_COLOR },
                timestamp,
            }],
        }
    }
}

pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: String) -> Result<Self> {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    /// A webhook that gives up on each request after `timeout`
    pub fn with_timeout(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub async fn run_started(&self, partition: &str) {
        let description = format!("Loading partition **{}**", partition);
        self.notify("Geonames Load Started", description, true).await;
    }

    pub async fn run_succeeded(&self, partition: &str, summary: &RunSummary) {
        let description = format!(
            "Published **{}** cities to **{}** for partition **{}** ({} records discarded).",
            summary.emitted.rows, summary.emitted.table, partition, summary.discarded
        );
        self.notify("Geonames Load Complete", description, true).await;
    }

    pub async fn run_failed(&self, partition: &str, report: &FailureReport) {
        let description = format!(
            "Partition **{}** failed:\n```{}```",
            partition,
            report.to_json()
        );
        self.notify(&report.kind.to_string(), description, false).await;
    }

    /// Notification failures never change the outcome of a run
    async fn notify(&self, title: &str, description: String, success: bool) {
        if let Err(e) = self.send(title, description, success).await {
            warn!("Discord notification '{}' not delivered: {:#}", title, e);
        }
    }

    async fn send(&self, title: &str, description: String, success: bool) -> Result<()> {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let payload = DiscordPayload::new(title, description, success, timestamp);

        let response = self.client.post(&self.url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("Failed to send Discord notification: {}", error_text);
            anyhow::bail!("Discord notification failed: {}", error_text);
        }

        info!("Sent Discord notification: {}", title);
        Ok(())
    }
}
