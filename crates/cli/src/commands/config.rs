use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use toml::Value;
use zarigani_core::config::{default_config_paths, AppConfig, LoadOptions};

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in effective_values(&config) {
        let source = field_source(
            entry.key,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(entry.key, &entry.value, source));
    }

    lines.join("\n")
}

struct ConfigLine {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn line(key: &'static str, value: String, env_keys: &'static [&'static str]) -> ConfigLine {
    ConfigLine { key, value, env_keys }
}

fn effective_values(config: &AppConfig) -> Vec<ConfigLine> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "<unset>".to_string());
    let path = |value: &Path| value.display().to_string();

    vec![
        line(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["ZARIGANI_SERVER_BIND_ADDRESS"],
        ),
        line("server.port", config.server.port.to_string(), &["ZARIGANI_SERVER_PORT", "PORT"]),
        line(
            "server.static_dir",
            optional(config.server.static_dir.as_deref().map(path)),
            &["ZARIGANI_SERVER_STATIC_DIR", "STATIC_DIRECTORY_PATH"],
        ),
        line(
            "server.allowed_origin_hosts",
            config.server.allowed_origin_hosts.join(","),
            &["ZARIGANI_SERVER_ALLOWED_ORIGIN_HOSTS"],
        ),
        line(
            "catalog.db_file_path",
            path(config.catalog.db_file_path.as_path()),
            &["ZARIGANI_CATALOG_DB_FILE_PATH", "IMAGES_DB_FILE_PATH"],
        ),
        line(
            "catalog.images_dir",
            path(config.catalog.images_dir.as_path()),
            &["ZARIGANI_CATALOG_IMAGES_DIR", "IMAGES_DIRECTORY_PATH"],
        ),
        line(
            "catalog.max_file_size_bytes",
            config.catalog.max_file_size_bytes.to_string(),
            &["ZARIGANI_CATALOG_MAX_FILE_SIZE_BYTES"],
        ),
        line(
            "catalog.cache_ttl_secs",
            config.catalog.cache_ttl_secs.to_string(),
            &["ZARIGANI_CATALOG_CACHE_TTL_SECS"],
        ),
        line(
            "catalog.dictionary_path",
            optional(config.catalog.dictionary_path.as_deref().map(path)),
            &["ZARIGANI_CATALOG_DICTIONARY_PATH"],
        ),
        line(
            "admin.credential",
            redact_secret(&config.admin.credential),
            &["ZARIGANI_ADMIN_CREDENTIAL", "NNKP_CREDENTIAL"],
        ),
        line("slack.enabled", config.slack.enabled.to_string(), &["ZARIGANI_SLACK_ENABLED"]),
        line(
            "slack.bot_token",
            redact_token(config.slack.bot_token.expose_secret()),
            &["ZARIGANI_SLACK_BOT_TOKEN", "NNKP_SLACK_BOT_TOKEN"],
        ),
        line(
            "slack.signing_secret",
            redact_secret(&config.slack.signing_secret),
            &["ZARIGANI_SLACK_SIGNING_SECRET", "NNKP_SLACK_SIGNING_SECRET"],
        ),
        line(
            "slack.webhook_url",
            if config.slack.webhook_url.is_some() { "<redacted>" } else { "<unset>" }.to_string(),
            &["ZARIGANI_SLACK_WEBHOOK_URL", "NNKP_SLACK_WEBHOOK_URL"],
        ),
        line("slack.app_id", optional(config.slack.app_id.clone()), &["ZARIGANI_SLACK_APP_ID"]),
        line(
            "generator.provider",
            config.generator.provider.as_str().to_string(),
            &["ZARIGANI_GENERATOR_PROVIDER"],
        ),
        line("generator.model", config.generator.model.clone(), &["ZARIGANI_GENERATOR_MODEL"]),
        line(
            "generator.api_key",
            config.generator.api_key.as_ref().map_or("<unset>".to_string(), redact_secret),
            &["ZARIGANI_GENERATOR_API_KEY"],
        ),
        line(
            "generator.base_url",
            optional(config.generator.base_url.clone()),
            &["ZARIGANI_GENERATOR_BASE_URL"],
        ),
        line(
            "generator.timeout_secs",
            config.generator.timeout_secs.to_string(),
            &["ZARIGANI_GENERATOR_TIMEOUT_SECS"],
        ),
        line(
            "generator.emotion_tagged",
            config.generator.emotion_tagged.to_string(),
            &["ZARIGANI_GENERATOR_EMOTION_TAGGED"],
        ),
        line(
            "logging.level",
            config.logging.level.clone(),
            &["ZARIGANI_LOGGING_LEVEL", "ZARIGANI_LOG_LEVEL"],
        ),
        line(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["ZARIGANI_LOGGING_FORMAT", "ZARIGANI_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }
    default_config_paths().into_iter().find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &SecretString) -> String {
    if secret.expose_secret().trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}

/// Keeps the `xoxb-` style prefix so the token kind stays visible.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
