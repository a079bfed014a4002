use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    client::{SlackApiError, SlackPoster},
    commands::{normalize_zc_command, CommandParseError, SlashCommandPayload},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    UrlVerification { challenge: String },
    AppMention(MessageEvent),
    DirectMessage(MessageEvent),
    SlashCommand(SlashCommandPayload),
    BotMessage { bot_id: String },
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::UrlVerification { .. } => SlackEventType::UrlVerification,
            Self::AppMention(_) => SlackEventType::AppMention,
            Self::DirectMessage(_) => SlackEventType::DirectMessage,
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::BotMessage { .. } => SlackEventType::BotMessage,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    UrlVerification,
    AppMention,
    DirectMessage,
    SlashCommand,
    BotMessage,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub user_id: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Replied { text: String },
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("event payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("event payload is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Post(#[from] SlackApiError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

/// How a question reached the bot. Decides the reply wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationKind {
    Mention,
    DirectMessage,
    SlashCommand,
}

impl ConversationKind {
    fn answered_prefix(self) -> &'static str {
        match self {
            Self::Mention => "メンションにお答えします!",
            Self::DirectMessage => "DM にお答えします!",
            Self::SlashCommand => "「/zc」コマンドにお答えします!",
        }
    }

    fn received_prefix(self) -> &'static str {
        match self {
            Self::Mention => "メンションありがとうございます。",
            Self::DirectMessage => "DM ありがとうございます。",
            Self::SlashCommand => "「/zc」コマンドを受信しました。",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponderReply {
    pub text: String,
    pub generated: bool,
}

/// Produces the answer to a question asked over Slack.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(
        &self,
        kind: ConversationKind,
        text: &str,
        correlation_id: &str,
    ) -> ResponderReply;
}

pub fn format_reply(kind: ConversationKind, reply: &ResponderReply) -> String {
    if reply.generated {
        format!("{}\n\n{}", kind.answered_prefix(), reply.text)
    } else {
        format!("{}\n{}", kind.received_prefix(), reply.text)
    }
}

/// Removes `<@U123>` style user mentions so only the question reaches the generator.
pub fn strip_mentions(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("<@") {
        match rest[start..].find('>') {
            Some(end) => {
                output.push_str(&rest[..start]);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    output.push_str(rest);
    output.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
struct RawCallback {
    #[serde(rename = "type")]
    kind: String,
    challenge: Option<String>,
    event_id: Option<String>,
    event: Option<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    subtype: Option<String>,
    channel: Option<String>,
    channel_type: Option<String>,
    user: Option<String>,
    bot_id: Option<String>,
    text: Option<String>,
}

/// Parses an Events API request body.
pub fn parse_event_payload(body: &[u8]) -> Result<SlackEnvelope, EventParseError> {
    let raw: RawCallback = serde_json::from_slice(body)
        .map_err(|error| EventParseError::InvalidJson(error.to_string()))?;

    if raw.kind == "url_verification" {
        let challenge = raw.challenge.ok_or(EventParseError::MissingField("challenge"))?;
        return Ok(SlackEnvelope {
            envelope_id: "url_verification".to_owned(),
            event: SlackEvent::UrlVerification { challenge },
        });
    }

    let envelope_id = raw.event_id.unwrap_or_else(|| "unknown-event".to_owned());
    let Some(event) = raw.event else {
        return Ok(SlackEnvelope {
            envelope_id,
            event: SlackEvent::Unsupported { event_type: raw.kind },
        });
    };

    if let Some(bot_id) = event.bot_id {
        return Ok(SlackEnvelope { envelope_id, event: SlackEvent::BotMessage { bot_id } });
    }

    let parsed = match event.kind.as_str() {
        "app_mention" => {
            SlackEvent::AppMention(message_event(event.channel, event.user, event.text)?)
        }
        "message"
            if event.subtype.is_none()
                && event.channel_type.as_deref().map_or(true, |kind| kind == "im") =>
        {
            SlackEvent::DirectMessage(message_event(event.channel, event.user, event.text)?)
        }
        _ => SlackEvent::Unsupported { event_type: event.kind },
    };

    Ok(SlackEnvelope { envelope_id, event: parsed })
}

fn message_event(
    channel: Option<String>,
    user: Option<String>,
    text: Option<String>,
) -> Result<MessageEvent, EventParseError> {
    Ok(MessageEvent {
        channel_id: channel.ok_or(EventParseError::MissingField("event.channel"))?,
        user_id: user,
        text: text.unwrap_or_default(),
    })
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            info!(
                event_name = "slack.event.ignored",
                correlation_id = %ctx.correlation_id,
                envelope_id = %envelope.envelope_id,
                event_type = ?envelope.event.event_type(),
                "no handler for slack event"
            );
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher answering mentions, direct messages and `/zc`.
pub fn chat_dispatcher(
    responder: Arc<dyn ChatResponder>,
    poster: Arc<dyn SlackPoster>,
) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(ConversationHandler::new(
        ConversationKind::Mention,
        Arc::clone(&responder),
        Arc::clone(&poster),
    ));
    dispatcher.register(ConversationHandler::new(
        ConversationKind::DirectMessage,
        Arc::clone(&responder),
        Arc::clone(&poster),
    ));
    dispatcher.register(ConversationHandler::new(ConversationKind::SlashCommand, responder, poster));
    dispatcher
}

pub struct ConversationHandler {
    kind: ConversationKind,
    responder: Arc<dyn ChatResponder>,
    poster: Arc<dyn SlackPoster>,
}

impl ConversationHandler {
    pub fn new(
        kind: ConversationKind,
        responder: Arc<dyn ChatResponder>,
        poster: Arc<dyn SlackPoster>,
    ) -> Self {
        Self { kind, responder, poster }
    }
}

#[async_trait]
impl EventHandler for ConversationHandler {
    fn event_type(&self) -> SlackEventType {
        match self.kind {
            ConversationKind::Mention => SlackEventType::AppMention,
            ConversationKind::DirectMessage => SlackEventType::DirectMessage,
            ConversationKind::SlashCommand => SlackEventType::SlashCommand,
        }
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let correlation_id = ctx.correlation_id.as_str();
        match (&envelope.event, self.kind) {
            (SlackEvent::AppMention(message), ConversationKind::Mention)
            | (SlackEvent::DirectMessage(message), ConversationKind::DirectMessage) => {
                let question = strip_mentions(&message.text);
                let reply = self.responder.respond(self.kind, &question, correlation_id).await;
                let text = format_reply(self.kind, &reply);
                self.poster.post_message(&message.channel_id, &text).await?;
                info!(
                    event_name = "slack.reply.posted",
                    correlation_id,
                    channel_id = %message.channel_id,
                    kind = ?self.kind,
                    "slack reply posted"
                );
                Ok(HandlerResult::Replied { text })
            }
            (SlackEvent::SlashCommand(payload), ConversationKind::SlashCommand) => {
                let command = normalize_zc_command(payload.clone())?;
                let reply = self.responder.respond(self.kind, &command.text, correlation_id).await;
                let text = format_reply(self.kind, &reply);
                self.poster.post_response_url(&command.response_url, &text).await?;
                info!(
                    event_name = "slack.command.answered",
                    correlation_id,
                    channel_id = %command.channel_id,
                    "slash command reply posted"
                );
                Ok(HandlerResult::Replied { text })
            }
            _ => {
                warn!(
                    event_name = "slack.event.mismatched_handler",
                    correlation_id,
                    event_type = ?envelope.event.event_type(),
                    "handler received an event it does not serve"
                );
                Ok(HandlerResult::Ignored)
            }
        }
    }
}
