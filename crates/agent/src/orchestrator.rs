use std::fmt;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, warn};

use zarigani_core::catalog::{select_by_emotion, select_by_keyword, select_random};
use zarigani_core::{Catalog, Emotion, NotificationSink, TagDictionary};
use zarigani_db::CatalogStore;

use crate::llm::TextGenerator;
use crate::prompt::build_messages;
use crate::reply::{extract_emotion, normalize_reply, ExtractedReply, APOLOGY_TEXT};

/// Where a question came from; used as the notification title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyChannel {
    Web,
    SlackMention,
    SlackDirectMessage,
    SlackCommand,
}

impl ReplyChannel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Web => "Web",
            Self::SlackMention => "Slack Mention",
            Self::SlackDirectMessage => "Slack DM",
            Self::SlackCommand => "Slack /zc",
        }
    }
}

impl fmt::Display for ReplyChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub output_text: String,
    pub image_file_name: Option<String>,
    #[serde(skip)]
    pub generated: bool,
    #[serde(skip)]
    pub emotion: Option<Emotion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReplyStage {
    Pending,
    GeneratorCalled,
    GeneratorFailed,
    GeneratorSucceeded,
    EmotionExtracted,
    ImageResolved,
    Done,
}

pub struct ReplyOrchestrator {
    generator: Arc<dyn TextGenerator>,
    store: Arc<CatalogStore>,
    dictionary: Arc<TagDictionary>,
    sink: Arc<dyn NotificationSink>,
    emotion_tagged: bool,
    rng: Mutex<StdRng>,
}

impl ReplyOrchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<CatalogStore>,
        dictionary: Arc<TagDictionary>,
        sink: Arc<dyn NotificationSink>,
        emotion_tagged: bool,
    ) -> Self {
        Self {
            generator,
            store,
            dictionary,
            sink,
            emotion_tagged,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Answers one question. Never fails: generator problems become the apology text and
    /// catalog problems become a reply without an image.
    pub async fn chat(
        &self,
        channel: ReplyChannel,
        input_text: &str,
        correlation_id: &str,
    ) -> ChatReply {
        self.stage(ReplyStage::Pending, correlation_id);
        let messages = build_messages(input_text, self.emotion_tagged);

        self.stage(ReplyStage::GeneratorCalled, correlation_id);
        let generated = match self.generator.generate(&messages).await {
            Ok(raw) => self.post_process(&raw),
            Err(error) => {
                warn!(
                    event_name = "reply.generator.failed",
                    correlation_id,
                    generator = self.generator.name(),
                    error = %error,
                    "text generation failed, replying with apology"
                );
                None
            }
        };

        let reply = match generated {
            Some(extracted) => {
                self.stage(ReplyStage::GeneratorSucceeded, correlation_id);
                self.stage(ReplyStage::EmotionExtracted, correlation_id);
                let image_file_name =
                    self.resolve_image(&extracted.text, extracted.emotion, correlation_id).await;
                ChatReply {
                    output_text: extracted.text,
                    image_file_name,
                    generated: true,
                    emotion: extracted.emotion,
                }
            }
            None => {
                self.stage(ReplyStage::GeneratorFailed, correlation_id);
                let image_file_name = self.resolve_random(correlation_id).await;
                ChatReply {
                    output_text: APOLOGY_TEXT.to_string(),
                    image_file_name,
                    generated: false,
                    emotion: None,
                }
            }
        };
        self.stage(ReplyStage::ImageResolved, correlation_id);

        let sink = Arc::clone(&self.sink);
        let title = channel.title();
        let input = input_text.to_string();
        let output = reply.output_text.clone();
        tokio::spawn(async move {
            sink.notify(title, &input, &output).await;
        });

        self.stage(ReplyStage::Done, correlation_id);
        reply
    }

    fn post_process(&self, raw: &str) -> Option<ExtractedReply> {
        let normalized = normalize_reply(raw);
        let extracted = if self.emotion_tagged {
            extract_emotion(&normalized)
        } else {
            ExtractedReply { emotion: None, text: normalized }
        };

        if extracted.text.trim().is_empty() {
            warn!(event_name = "reply.generator.empty", "generator reply had no usable text");
            return None;
        }
        Some(extracted)
    }

    async fn resolve_image(
        &self,
        text: &str,
        emotion: Option<Emotion>,
        correlation_id: &str,
    ) -> Option<String> {
        let catalog = self.catalog(correlation_id).await?;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(emotion) = emotion {
            if let Some(file_name) = select_by_emotion(&catalog, emotion, &mut *rng) {
                debug!(
                    event_name = "reply.image.emotion",
                    correlation_id,
                    %emotion,
                    file_name = %file_name
                );
                return Some(file_name);
            }
        }
        if let Some(file_name) = select_by_keyword(&catalog, text, &self.dictionary, &mut *rng) {
            debug!(event_name = "reply.image.keyword", correlation_id, file_name = %file_name);
            return Some(file_name);
        }
        select_random(&catalog, &mut *rng).ok()
    }

    async fn resolve_random(&self, correlation_id: &str) -> Option<String> {
        let catalog = self.catalog(correlation_id).await?;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        select_random(&catalog, &mut *rng).ok()
    }

    async fn catalog(&self, correlation_id: &str) -> Option<Arc<Catalog>> {
        match self.store.load_catalog(false).await {
            Ok(catalog) => Some(catalog),
            Err(error) => {
                warn!(
                    event_name = "reply.catalog.unavailable",
                    correlation_id,
                    error = %error,
                    "catalog could not be loaded, replying without an image"
                );
                None
            }
        }
    }

    fn stage(&self, stage: ReplyStage, correlation_id: &str) {
        debug!(event_name = "reply.stage", correlation_id, stage = ?stage);
    }
}
