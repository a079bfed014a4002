use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Transport(String),
    #[error("generator request timed out")]
    Timeout,
    #[error("generator answered with status {status}")]
    Status { status: u16 },
    #[error("generator response was malformed: {0}")]
    Malformed(String),
    #[error("generator returned an empty reply")]
    EmptyReply,
    #[error("generator client could not be built: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for GeneratorError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// A third-party text-generation endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, GeneratorError>;
}
