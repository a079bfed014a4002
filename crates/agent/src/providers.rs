use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

use zarigani_core::config::{GeneratorConfig, GeneratorProvider};

use crate::llm::{ChatMessage, GeneratorError, TextGenerator};

const NEXRA_ENDPOINT: &str = "https://nexra.aryahcr.cc/api/chat/gpt";
const BLACKBOX_ENDPOINT: &str = "https://www.blackbox.ai/api/chat";
const CHATGPT42_ENDPOINT: &str = "https://chatgpt-42.p.rapidapi.com/conversationgpt4";
const CHATGPT42_HOST: &str = "chatgpt-42.p.rapidapi.com";
const RNILAWEERA_ENDPOINT: &str = "https://api.rnilaweera.lk/api/v1/user/gpt";
const WIDIPE_ENDPOINT: &str = "https://widipe.com/openai";
const ANDRIE_ENDPOINT: &str = "https://andrie.vercel.app/api/gpt";

/// Generator backed by one of the supported free chat endpoints.
#[derive(Clone)]
pub struct HttpTextGenerator {
    client: Client,
    provider: GeneratorProvider,
    model: String,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl HttpTextGenerator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| GeneratorError::Setup(error.to_string()))?;

        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_endpoint(config.provider).to_string());

        Ok(Self {
            client,
            provider: config.provider,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            endpoint,
        })
    }

    pub fn provider(&self) -> GeneratorProvider {
        self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_key(&self) -> Result<&str, GeneratorError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                GeneratorError::Setup(format!("provider `{}` needs an api key", self.provider.as_str()))
            })
    }

    fn request(&self, messages: &[ChatMessage]) -> Result<reqwest::RequestBuilder, GeneratorError> {
        let builder = match self.provider {
            GeneratorProvider::Nexra => self.client.post(&self.endpoint).json(&json!({
                "messages": messages,
                "model": self.model,
                "stream": false,
                "markdown": false,
            })),
            GeneratorProvider::Blackbox => self.client.post(&self.endpoint).json(&json!({
                "messages": messages,
                "agentMode": {},
                "codeModelMode": true,
                "isChromeExt": false,
                "isMicMode": false,
                "playgroundMode": false,
                "trendingAgentMode": {},
                "userSystemPrompt": "",
                "webSearchMode": false,
            })),
            GeneratorProvider::ChatGpt42 => self
                .client
                .post(&self.endpoint)
                .header("X-RapidAPI-Key", self.api_key()?)
                .header("X-RapidAPI-Host", CHATGPT42_HOST)
                .json(&json!({
                    "messages": messages,
                    "temperature": 0.2,
                    "top_k": 5,
                    "top_p": 0.9,
                    "max_tokens": 806,
                    "web_access": false,
                })),
            GeneratorProvider::Rnilaweera => self
                .client
                .post(&self.endpoint)
                .bearer_auth(self.api_key()?)
                .json(&json!({ "prompt": flatten_prompt(messages) })),
            GeneratorProvider::Widipe => {
                self.client.get(&self.endpoint).query(&[("text", flatten_prompt(messages))])
            }
            GeneratorProvider::Andrie => {
                self.client.get(&self.endpoint).query(&[("query", flatten_prompt(messages))])
            }
        };
        Ok(builder)
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    fn name(&self) -> &'static str {
        self.provider.as_str()
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError> {
        let response = self.request(messages)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Status { status: status.as_u16() });
        }

        let body = response.text().await?;
        debug!(
            event_name = "generator.response.received",
            provider = self.provider.as_str(),
            bytes = body.len(),
            "generator responded"
        );
        parse_reply(self.provider, &body)
    }
}

pub fn default_endpoint(provider: GeneratorProvider) -> &'static str {
    match provider {
        GeneratorProvider::Nexra => NEXRA_ENDPOINT,
        GeneratorProvider::Blackbox => BLACKBOX_ENDPOINT,
        GeneratorProvider::ChatGpt42 => CHATGPT42_ENDPOINT,
        GeneratorProvider::Rnilaweera => RNILAWEERA_ENDPOINT,
        GeneratorProvider::Widipe => WIDIPE_ENDPOINT,
        GeneratorProvider::Andrie => ANDRIE_ENDPOINT,
    }
}

/// Single-prompt providers receive the whole conversation as one block of text.
pub fn flatten_prompt(messages: &[ChatMessage]) -> String {
    messages.iter().map(|message| message.content.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Pulls the reply text out of a provider response body.
pub fn parse_reply(provider: GeneratorProvider, body: &str) -> Result<String, GeneratorError> {
    let text = match provider {
        GeneratorProvider::Blackbox => strip_blackbox_markers(body),
        GeneratorProvider::Nexra => json_field(body, "gpt")?,
        GeneratorProvider::Rnilaweera => json_field(body, "message")?,
        GeneratorProvider::ChatGpt42 | GeneratorProvider::Widipe | GeneratorProvider::Andrie => {
            json_field(body, "result")?
        }
    };

    if text.trim().is_empty() {
        return Err(GeneratorError::EmptyReply);
    }
    Ok(text)
}

fn json_field(body: &str, field: &str) -> Result<String, GeneratorError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|error| GeneratorError::Malformed(error.to_string()))?;
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GeneratorError::Malformed(format!("missing string field `{field}`")))
}

/// Removes `$@$...$@$` metadata segments.
fn strip_blackbox_markers(body: &str) -> String {
    const MARKER: &str = "$@$";
    let mut output = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(MARKER) {
        let after_open = &rest[start + MARKER.len()..];
        match after_open.find(MARKER) {
            Some(end) => {
                output.push_str(&rest[..start]);
                rest = &after_open[end + MARKER.len()..];
            }
            None => break,
        }
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use zarigani_core::config::{GeneratorConfig, GeneratorProvider};

    use super::{default_endpoint, flatten_prompt, parse_reply, HttpTextGenerator};
    use crate::llm::{ChatMessage, GeneratorError};

    #[test]
    fn json_providers_read_their_reply_field() {
        assert_eq!(
            parse_reply(GeneratorProvider::Nexra, r#"{"status":true,"gpt":"にゃー"}"#)
                .expect("nexra"),
            "にゃー"
        );
        assert_eq!(
            parse_reply(GeneratorProvider::Rnilaweera, r#"{"message":"hello"}"#).expect("rsn"),
            "hello"
        );
        assert_eq!(
            parse_reply(GeneratorProvider::Andrie, r#"{"result":"ok"}"#).expect("andrie"),
            "ok"
        );
    }

    #[test]
    fn malformed_or_empty_bodies_are_failures() {
        assert!(matches!(
            parse_reply(GeneratorProvider::Nexra, "<html>"),
            Err(GeneratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_reply(GeneratorProvider::Widipe, r#"{"status":false}"#),
            Err(GeneratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_reply(GeneratorProvider::ChatGpt42, r#"{"result":"  "}"#),
            Err(GeneratorError::EmptyReply)
        ));
    }

    #[test]
    fn blackbox_markers_are_stripped() {
        let body = "$@$v=undefined-rv1$@$ザリガニ猫は$@$x$@$元気です";
        assert_eq!(
            parse_reply(GeneratorProvider::Blackbox, body).expect("blackbox"),
            "ザリガニ猫は元気です"
        );
        assert_eq!(
            parse_reply(GeneratorProvider::Blackbox, "price is $@$ only").expect("unterminated"),
            "price is $@$ only"
        );
    }

    #[test]
    fn flattened_prompt_keeps_message_order() {
        let messages = vec![ChatMessage::user("a"), ChatMessage::assistant("b"), ChatMessage::user("c")];
        assert_eq!(flatten_prompt(&messages), "a\n\nb\n\nc");
    }

    #[test]
    fn base_url_overrides_the_provider_endpoint() {
        let mut config = GeneratorConfig {
            provider: GeneratorProvider::Widipe,
            model: "gpt3.5-turbo".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 5,
            emotion_tagged: false,
        };
        let default = HttpTextGenerator::from_config(&config).expect("client");
        config.base_url = Some("http://127.0.0.1:9/openai".to_string());
        let overridden = HttpTextGenerator::from_config(&config).expect("client");

        assert_eq!(default.endpoint(), default_endpoint(GeneratorProvider::Widipe));
        assert_eq!(overridden.endpoint(), "http://127.0.0.1:9/openai");
    }
}
