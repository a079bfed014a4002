use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tokio::sync::mpsc;
use zarigani_agent::{ChatMessage, GeneratorError, ReplyOrchestrator, TextGenerator};
use zarigani_core::config::AppConfig;
use zarigani_core::{NoopNotificationSink, TagDictionary};
use zarigani_db::{CatalogMutations, CatalogRepository, CatalogStore, ImageDirectory};
use zarigani_slack::events::chat_dispatcher;
use zarigani_slack::{SlackApiError, SlackPoster};

use crate::bootstrap::Application;
use crate::responder::OrchestratorResponder;
use crate::slack::SlackState;

pub const CREDENTIAL: &str = "open-sesame";
pub const SIGNING_SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

const SEED_CATALOG: &str = r#"[
  {"id": 1, "file_name": "2024-01-01-09-00-00.png", "tags": ["喜"]},
  {"id": 2, "file_name": "2024-01-02-09-00-00.jpg", "tags": ["play"]}
]"#;

pub struct FixedGenerator {
    reply: Option<String>,
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, GeneratorError> {
        self.reply.clone().ok_or(GeneratorError::EmptyReply)
    }
}

/// Where a Slack reply was sent, and what it said.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Posted {
    Channel { channel_id: String, text: String },
    ResponseUrl { url: String, text: String },
}

pub struct RecordingPoster {
    sender: mpsc::UnboundedSender<Posted>,
}

#[async_trait]
impl SlackPoster for RecordingPoster {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), SlackApiError> {
        let _ = self
            .sender
            .send(Posted::Channel { channel_id: channel_id.to_owned(), text: text.to_owned() });
        Ok(())
    }

    async fn post_response_url(&self, response_url: &str, text: &str) -> Result<(), SlackApiError> {
        let _ = self
            .sender
            .send(Posted::ResponseUrl { url: response_url.to_owned(), text: text.to_owned() });
        Ok(())
    }
}

/// Application wired like production but with a canned generator, a recording Slack
/// poster and everything on disk under a temp dir. The catalog starts with two images.
pub struct TestApp {
    pub dir: TempDir,
    pub app: Application,
    pub posted: mpsc::UnboundedReceiver<Posted>,
}

impl TestApp {
    pub fn new(reply: Option<&str>) -> Self {
        Self::build(reply, |_| {})
    }

    pub fn build(reply: Option<&str>, configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut config = AppConfig::default();
        config.catalog.db_file_path = dir.path().join("images.json");
        config.catalog.images_dir = dir.path().join("images");
        config.admin.credential = CREDENTIAL.to_string().into();
        config.slack.enabled = true;
        config.slack.signing_secret = SIGNING_SECRET.to_string().into();
        config.slack.app_id = Some("A0TESTAPP".to_owned());
        config.slack.install_url = Some("https://slack.com/oauth/v2/authorize?client_id=1".to_owned());
        configure(&mut config);

        std::fs::write(&config.catalog.db_file_path, SEED_CATALOG).expect("seed catalog");
        std::fs::create_dir_all(&config.catalog.images_dir).expect("images dir");
        for name in ["2024-01-01-09-00-00.png", "2024-01-02-09-00-00.jpg"] {
            std::fs::write(config.catalog.images_dir.join(name), b"image").expect("seed image");
        }

        let store = Arc::new(CatalogStore::with_ttl(
            config.catalog.db_file_path.clone(),
            config.catalog.cache_ttl(),
        ));
        let mutations = Arc::new(CatalogMutations::new(
            Arc::new(CatalogRepository::new(Arc::clone(&store))),
            Arc::new(ImageDirectory::new(config.catalog.images_dir.clone())),
            config.admin.credential.clone(),
            config.catalog.max_file_size_bytes,
        ));
        let orchestrator = Arc::new(
            ReplyOrchestrator::new(
                Arc::new(FixedGenerator { reply: reply.map(str::to_owned) }),
                Arc::clone(&store),
                Arc::new(TagDictionary::from_pairs([("遊ぶ", "play")])),
                Arc::new(NoopNotificationSink),
                config.generator.emotion_tagged,
            )
            .with_rng(StdRng::seed_from_u64(7)),
        );

        let (sender, posted) = mpsc::unbounded_channel();
        let slack = config.slack.enabled.then(|| {
            SlackState::new(
                config.slack.signing_secret.clone(),
                chat_dispatcher(
                    Arc::new(OrchestratorResponder::new(Arc::clone(&orchestrator))),
                    Arc::new(RecordingPoster { sender }),
                ),
            )
        });

        Self { dir, app: Application { config, store, mutations, orchestrator, slack }, posted }
    }
}
