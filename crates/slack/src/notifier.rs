use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use zarigani_core::jst::format_log_timestamp;
use zarigani_core::NotificationSink;

/// Logs each chat exchange to a Slack incoming webhook. Without a URL it only warns.
#[derive(Clone)]
pub struct SlackWebhookNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl SlackWebhookNotifier {
    pub fn new(client: Client, webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        Self { client, webhook_url }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

pub fn format_notification(
    now: DateTime<Utc>,
    title: &str,
    input_text: &str,
    output_text: &str,
) -> String {
    format!("【{}】{title}\n【Q】{input_text}\n【A】{output_text}", format_log_timestamp(now))
}

#[async_trait]
impl NotificationSink for SlackWebhookNotifier {
    async fn notify(&self, title: &str, input_text: &str, output_text: &str) {
        info!(event_name = "notify.exchange", title, input_text, output_text, "chat exchange");
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            warn!(event_name = "notify.skipped", "slack webhook url is not set, exchange not sent");
            return;
        };

        let text = format_notification(Utc::now(), title, input_text, output_text);
        let result = self.client.post(webhook_url).json(&json!({ "text": text })).send().await;
        match result {
            Ok(response) if response.status().is_success() => {
                info!(event_name = "notify.sent", "exchange sent to slack webhook");
            }
            Ok(response) => {
                warn!(
                    event_name = "notify.failed",
                    status = response.status().as_u16(),
                    "slack webhook rejected the exchange"
                );
            }
            Err(error) => {
                warn!(event_name = "notify.failed", error = %error, "slack webhook request failed");
            }
        }
    }
}
