use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use zarigani_agent::{GeneratorError, HttpTextGenerator, ReplyOrchestrator};
use zarigani_core::catalog::DictionaryError;
use zarigani_core::config::AppConfig;
use zarigani_core::{CatalogError, TagDictionary};
use zarigani_db::{CatalogMutations, CatalogRepository, CatalogStore, ImageDirectory};
use zarigani_slack::events::chat_dispatcher;
use zarigani_slack::{SlackWebClient, SlackWebhookNotifier};

use crate::responder::OrchestratorResponder;
use crate::slack::SlackState;

const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<CatalogStore>,
    pub mutations: Arc<CatalogMutations>,
    pub orchestrator: Arc<ReplyOrchestrator>,
    pub slack: Option<SlackState>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("tag dictionary could not be loaded: {0}")]
    Dictionary(#[from] DictionaryError),
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[source] CatalogError),
    #[error("directory `{path}` could not be created: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("text generator setup failed: {0}")]
    Generator(#[source] GeneratorError),
    #[error("http client setup failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let store = Arc::new(CatalogStore::with_ttl(
        config.catalog.db_file_path.clone(),
        config.catalog.cache_ttl(),
    ));
    let catalog = store.load_catalog(true).await.map_err(BootstrapError::Catalog)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        path = %config.catalog.db_file_path.display(),
        image_count = catalog.len(),
        "catalog loaded"
    );

    let db_dir = config.catalog.db_file_path.parent().filter(|dir| !dir.as_os_str().is_empty());
    for dir in db_dir.into_iter().chain([config.catalog.images_dir.as_path()]) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| BootstrapError::CreateDir { path: dir.to_path_buf(), source })?;
    }

    let repository = Arc::new(CatalogRepository::new(Arc::clone(&store)));
    let images = Arc::new(ImageDirectory::new(config.catalog.images_dir.clone()));
    let mutations = Arc::new(CatalogMutations::new(
        repository,
        images,
        config.admin.credential.clone(),
        config.catalog.max_file_size_bytes,
    ));

    let dictionary =
        Arc::new(TagDictionary::load_or_default(config.catalog.dictionary_path.as_deref())?);
    info!(
        event_name = "system.bootstrap.dictionary_loaded",
        correlation_id = "bootstrap",
        entries = dictionary.len(),
        "tag dictionary loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .map_err(BootstrapError::HttpClient)?;

    let notifier = SlackWebhookNotifier::new(http.clone(), config.slack.webhook_url.clone());
    if !notifier.is_configured() {
        warn!(
            event_name = "system.bootstrap.notifier_disabled",
            correlation_id = "bootstrap",
            "slack webhook url is not set, chat exchanges will not be forwarded"
        );
    }

    let generator =
        HttpTextGenerator::from_config(&config.generator).map_err(BootstrapError::Generator)?;
    info!(
        event_name = "system.bootstrap.generator_ready",
        correlation_id = "bootstrap",
        provider = generator.provider().as_str(),
        endpoint = generator.endpoint(),
        emotion_tagged = config.generator.emotion_tagged,
        "text generator configured"
    );

    let orchestrator = Arc::new(ReplyOrchestrator::new(
        Arc::new(generator),
        Arc::clone(&store),
        dictionary,
        Arc::new(notifier),
        config.generator.emotion_tagged,
    ));

    let slack = config.slack.enabled.then(|| {
        let poster = SlackWebClient::new(http, config.slack.bot_token.clone());
        let responder = OrchestratorResponder::new(Arc::clone(&orchestrator));
        SlackState::new(
            config.slack.signing_secret.clone(),
            chat_dispatcher(Arc::new(responder), Arc::new(poster)),
        )
    });
    info!(
        event_name = "system.bootstrap.slack",
        correlation_id = "bootstrap",
        enabled = slack.is_some(),
        "slack routes configured"
    );

    Ok(Application { config, store, mutations, orchestrator, slack })
}
