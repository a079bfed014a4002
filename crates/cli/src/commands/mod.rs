pub mod catalog;
pub mod config;
pub mod doctor;

use std::sync::Arc;

use serde::Serialize;
use zarigani_core::config::AppConfig;
use zarigani_core::Catalog;
use zarigani_db::CatalogStore;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Failure shared by commands that read the catalog: `(error_class, message, exit_code)`.
pub(crate) type CatalogReadFailure = (&'static str, String, u8);

/// Reads the catalog document named by the config, bypassing any cache.
pub(crate) fn read_catalog(config: &AppConfig) -> Result<Arc<Catalog>, CatalogReadFailure> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| ("runtime_init", format!("failed to initialize async runtime: {error}"), 3))?;

    let store = CatalogStore::new(config.catalog.db_file_path.clone());
    runtime
        .block_on(store.load_catalog(true))
        .map_err(|error| ("catalog_read", error.to_string(), 4))
}
