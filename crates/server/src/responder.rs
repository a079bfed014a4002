use std::sync::Arc;

use async_trait::async_trait;
use zarigani_agent::{ReplyChannel, ReplyOrchestrator};
use zarigani_slack::{ChatResponder, ConversationKind, ResponderReply};

/// Answers Slack conversations with the same orchestrator the web chat uses.
pub struct OrchestratorResponder {
    orchestrator: Arc<ReplyOrchestrator>,
}

impl OrchestratorResponder {
    pub fn new(orchestrator: Arc<ReplyOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

pub fn reply_channel(kind: ConversationKind) -> ReplyChannel {
    match kind {
        ConversationKind::Mention => ReplyChannel::SlackMention,
        ConversationKind::DirectMessage => ReplyChannel::SlackDirectMessage,
        ConversationKind::SlashCommand => ReplyChannel::SlackCommand,
    }
}

#[async_trait]
impl ChatResponder for OrchestratorResponder {
    async fn respond(
        &self,
        kind: ConversationKind,
        text: &str,
        correlation_id: &str,
    ) -> ResponderReply {
        let reply = self.orchestrator.chat(reply_channel(kind), text, correlation_id).await;
        ResponderReply { text: reply.output_text, generated: reply.generated }
    }
}

#[cfg(test)]
mod tests {
    use zarigani_agent::ReplyChannel;
    use zarigani_slack::{ChatResponder, ConversationKind};

    use super::{reply_channel, OrchestratorResponder};
    use crate::test_support::TestApp;

    #[test]
    fn conversation_kinds_map_to_notification_titles() {
        assert_eq!(reply_channel(ConversationKind::Mention).title(), "Slack Mention");
        assert_eq!(reply_channel(ConversationKind::DirectMessage).title(), "Slack DM");
        assert_eq!(reply_channel(ConversationKind::SlashCommand), ReplyChannel::SlackCommand);
    }

    #[tokio::test]
    async fn generator_failure_is_reported_as_not_generated() {
        let app = TestApp::new(None);
        let responder = OrchestratorResponder::new(app.app.orchestrator.clone());

        let reply = responder.respond(ConversationKind::DirectMessage, "元気?", "cid-1").await;

        assert!(!reply.generated);
        assert!(!reply.text.is_empty());
    }

    #[tokio::test]
    async fn generated_reply_text_is_passed_through() {
        let app = TestApp::new(Some("猫が寝ています"));
        let responder = OrchestratorResponder::new(app.app.orchestrator.clone());

        let reply = responder.respond(ConversationKind::Mention, "様子は?", "cid-2").await;

        assert!(reply.generated);
        assert_eq!(reply.text, "猫が寝ています");
    }
}
