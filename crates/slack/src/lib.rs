//! Slack Integration - Events API bot and exchange logging
//!
//! This crate provides the Slack interface for the chatbot:
//! - **Signatures** (`signature`) - `X-Slack-Signature` verification for inbound requests
//! - **Events** (`events`) - mentions and direct messages, routed through `EventDispatcher`
//! - **Slash Commands** (`commands`) - the `/zc` command, answered via `response_url`
//! - **Web API** (`client`) - `chat.postMessage` and `response_url` posting
//! - **Notifier** (`notifier`) - incoming-webhook log of every chat exchange
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Point Event Subscriptions at `/slack/events` and the `/zc` command at `/slack/zc`
//! 3. Subscribe to `app_mention` and `message.im`
//! 4. Set env vars: `ZARIGANI_SLACK_BOT_TOKEN`, `ZARIGANI_SLACK_SIGNING_SECRET`
//!
//! # Architecture
//!
//! ```text
//! HTTP request → verify_signature → parse → EventDispatcher → ChatResponder
//!                                                 ↓
//!                              SlackPoster (chat.postMessage / response_url)
//! ```

pub mod client;
pub mod commands;
pub mod events;
pub mod notifier;
pub mod signature;

pub use client::{SlackApiError, SlackPoster, SlackWebClient};
pub use commands::SlashCommandPayload;
pub use events::{
    ChatResponder, ConversationKind, EventContext, EventDispatcher, HandlerResult,
    ResponderReply, SlackEnvelope, SlackEvent,
};
pub use notifier::SlackWebhookNotifier;
pub use signature::{verify_signature, SignatureError};
