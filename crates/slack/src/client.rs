use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("slack request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("slack answered with status {0}")]
    Status(u16),
    #[error("slack api error: {0}")]
    Api(String),
}

/// Outbound Slack messaging.
#[async_trait]
pub trait SlackPoster: Send + Sync {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), SlackApiError>;

    /// Posts a visible-to-channel reply to a slash command's `response_url`.
    async fn post_response_url(&self, response_url: &str, text: &str) -> Result<(), SlackApiError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackWebClient {
    client: Client,
    bot_token: SecretString,
    api_base: String,
}

impl SlackWebClient {
    pub fn new(client: Client, bot_token: SecretString) -> Self {
        Self::with_api_base(client, bot_token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(client: Client, bot_token: SecretString, api_base: impl Into<String>) -> Self {
        Self { client, bot_token, api_base: api_base.into().trim_end_matches('/').to_owned() }
    }
}

#[async_trait]
impl SlackPoster for SlackWebClient {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), SlackApiError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&json!({ "channel": channel_id, "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SlackApiError::Status(response.status().as_u16()));
        }

        let body: ApiResponse = response.json().await?;
        if body.ok {
            Ok(())
        } else {
            Err(SlackApiError::Api(body.error.unwrap_or_else(|| "unknown_error".to_owned())))
        }
    }

    async fn post_response_url(&self, response_url: &str, text: &str) -> Result<(), SlackApiError> {
        let response = self
            .client
            .post(response_url)
            .json(&json!({ "response_type": "in_channel", "text": text }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SlackApiError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
