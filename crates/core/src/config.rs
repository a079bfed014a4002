use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DEFAULT_MAX_FILE_SIZE_BYTES;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub admin: AdminConfig,
    pub slack: SlackConfig,
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub allowed_origin_hosts: Vec<String>,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub db_file_path: PathBuf,
    pub images_dir: PathBuf,
    pub max_file_size_bytes: u64,
    pub cache_ttl_secs: u64,
    pub dictionary_path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub credential: SecretString,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub enabled: bool,
    pub bot_token: SecretString,
    pub signing_secret: SecretString,
    pub webhook_url: Option<String>,
    pub app_id: Option<String>,
    pub install_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub provider: GeneratorProvider,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub emotion_tagged: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorProvider {
    Nexra,
    Blackbox,
    #[serde(rename = "chatgpt42")]
    ChatGpt42,
    Rnilaweera,
    Widipe,
    Andrie,
}

impl GeneratorProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nexra => "nexra",
            Self::Blackbox => "blackbox",
            Self::ChatGpt42 => "chatgpt42",
            Self::Rnilaweera => "rnilaweera",
            Self::Widipe => "widipe",
            Self::Andrie => "andrie",
        }
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, Self::ChatGpt42 | Self::Rnilaweera)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub db_file_path: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub admin_credential: Option<String>,
    pub log_level: Option<String>,
    pub generator_provider: Option<GeneratorProvider>,
    pub slack_webhook_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                static_dir: None,
                allowed_origin_hosts: vec!["localhost".to_string()],
                graceful_shutdown_secs: 15,
            },
            catalog: CatalogConfig {
                db_file_path: PathBuf::from("db/images.json"),
                images_dir: PathBuf::from("public/images"),
                max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
                cache_ttl_secs: 60 * 60,
                dictionary_path: None,
            },
            admin: AdminConfig { credential: String::new().into() },
            slack: SlackConfig {
                enabled: false,
                bot_token: String::new().into(),
                signing_secret: String::new().into(),
                webhook_url: None,
                app_id: None,
                install_url: None,
            },
            generator: GeneratorConfig {
                provider: GeneratorProvider::Nexra,
                model: "gpt3.5-turbo".to_string(),
                api_key: None,
                base_url: None,
                timeout_secs: 30,
                emotion_tagged: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for GeneratorProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nexra" => Ok(Self::Nexra),
            "blackbox" => Ok(Self::Blackbox),
            "chatgpt42" => Ok(Self::ChatGpt42),
            "rnilaweera" => Ok(Self::Rnilaweera),
            "widipe" => Ok(Self::Widipe),
            "andrie" => Ok(Self::Andrie),
            other => Err(ConfigError::Validation(format!(
                "unsupported generator provider `{other}` (expected nexra|blackbox|chatgpt42|rnilaweera|widipe|andrie)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("zarigani.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(static_dir) = server.static_dir {
                self.server.static_dir = Some(static_dir);
            }
            if let Some(allowed_origin_hosts) = server.allowed_origin_hosts {
                self.server.allowed_origin_hosts = allowed_origin_hosts;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(db_file_path) = catalog.db_file_path {
                self.catalog.db_file_path = db_file_path;
            }
            if let Some(images_dir) = catalog.images_dir {
                self.catalog.images_dir = images_dir;
            }
            if let Some(max_file_size_bytes) = catalog.max_file_size_bytes {
                self.catalog.max_file_size_bytes = max_file_size_bytes;
            }
            if let Some(cache_ttl_secs) = catalog.cache_ttl_secs {
                self.catalog.cache_ttl_secs = cache_ttl_secs;
            }
            if let Some(dictionary_path) = catalog.dictionary_path {
                self.catalog.dictionary_path = Some(dictionary_path);
            }
        }

        if let Some(admin) = patch.admin {
            if let Some(credential_value) = admin.credential {
                self.admin.credential = secret_value(credential_value);
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(enabled) = slack.enabled {
                self.slack.enabled = enabled;
            }
            if let Some(bot_token_value) = slack.bot_token {
                self.slack.bot_token = secret_value(bot_token_value);
            }
            if let Some(signing_secret_value) = slack.signing_secret {
                self.slack.signing_secret = secret_value(signing_secret_value);
            }
            if let Some(webhook_url) = slack.webhook_url {
                self.slack.webhook_url = Some(webhook_url);
            }
            if let Some(app_id) = slack.app_id {
                self.slack.app_id = Some(app_id);
            }
            if let Some(install_url) = slack.install_url {
                self.slack.install_url = Some(install_url);
            }
        }

        if let Some(generator) = patch.generator {
            if let Some(provider) = generator.provider {
                self.generator.provider = provider;
            }
            if let Some(model) = generator.model {
                self.generator.model = model;
            }
            if let Some(api_key_value) = generator.api_key {
                self.generator.api_key = Some(secret_value(api_key_value));
            }
            if let Some(base_url) = generator.base_url {
                self.generator.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = generator.timeout_secs {
                self.generator.timeout_secs = timeout_secs;
            }
            if let Some(emotion_tagged) = generator.emotion_tagged {
                self.generator.emotion_tagged = emotion_tagged;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ZARIGANI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ZARIGANI_SERVER_PORT") {
            self.server.port = parse_u16("ZARIGANI_SERVER_PORT", &value)?;
        } else if let Some(value) = read_env("PORT") {
            self.server.port = parse_u16("PORT", &value)?;
        }
        let static_dir =
            read_env("ZARIGANI_SERVER_STATIC_DIR").or_else(|| read_env("STATIC_DIRECTORY_PATH"));
        if let Some(value) = static_dir {
            self.server.static_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("ZARIGANI_SERVER_ALLOWED_ORIGIN_HOSTS") {
            self.server.allowed_origin_hosts = parse_list(&value);
        }
        if let Some(value) = read_env("ZARIGANI_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ZARIGANI_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let db_file_path =
            read_env("ZARIGANI_CATALOG_DB_FILE_PATH").or_else(|| read_env("IMAGES_DB_FILE_PATH"));
        if let Some(value) = db_file_path {
            self.catalog.db_file_path = PathBuf::from(value);
        }
        let images_dir =
            read_env("ZARIGANI_CATALOG_IMAGES_DIR").or_else(|| read_env("IMAGES_DIRECTORY_PATH"));
        if let Some(value) = images_dir {
            self.catalog.images_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("ZARIGANI_CATALOG_MAX_FILE_SIZE_BYTES") {
            self.catalog.max_file_size_bytes =
                parse_u64("ZARIGANI_CATALOG_MAX_FILE_SIZE_BYTES", &value)?;
        }
        if let Some(value) = read_env("ZARIGANI_CATALOG_CACHE_TTL_SECS") {
            self.catalog.cache_ttl_secs = parse_u64("ZARIGANI_CATALOG_CACHE_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("ZARIGANI_CATALOG_DICTIONARY_PATH") {
            self.catalog.dictionary_path = Some(PathBuf::from(value));
        }

        let credential =
            read_env("ZARIGANI_ADMIN_CREDENTIAL").or_else(|| read_env("NNKP_CREDENTIAL"));
        if let Some(value) = credential {
            self.admin.credential = secret_value(value);
        }

        if let Some(value) = read_env("ZARIGANI_SLACK_ENABLED") {
            self.slack.enabled = parse_bool("ZARIGANI_SLACK_ENABLED", &value)?;
        }
        let bot_token =
            read_env("ZARIGANI_SLACK_BOT_TOKEN").or_else(|| read_env("NNKP_SLACK_BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.slack.bot_token = secret_value(value);
        }
        let signing_secret = read_env("ZARIGANI_SLACK_SIGNING_SECRET")
            .or_else(|| read_env("NNKP_SLACK_SIGNING_SECRET"));
        if let Some(value) = signing_secret {
            self.slack.signing_secret = secret_value(value);
        }
        let webhook_url =
            read_env("ZARIGANI_SLACK_WEBHOOK_URL").or_else(|| read_env("NNKP_SLACK_WEBHOOK_URL"));
        if let Some(value) = webhook_url {
            self.slack.webhook_url = Some(value);
        }
        if let Some(value) = read_env("ZARIGANI_SLACK_APP_ID") {
            self.slack.app_id = Some(value);
        }
        if let Some(value) = read_env("ZARIGANI_SLACK_INSTALL_URL") {
            self.slack.install_url = Some(value);
        }

        if let Some(value) = read_env("ZARIGANI_GENERATOR_PROVIDER") {
            self.generator.provider = value.parse()?;
        }
        if let Some(value) = read_env("ZARIGANI_GENERATOR_MODEL") {
            self.generator.model = value;
        }
        if let Some(value) = read_env("ZARIGANI_GENERATOR_API_KEY") {
            self.generator.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("ZARIGANI_GENERATOR_BASE_URL") {
            self.generator.base_url = Some(value);
        }
        if let Some(value) = read_env("ZARIGANI_GENERATOR_TIMEOUT_SECS") {
            self.generator.timeout_secs = parse_u64("ZARIGANI_GENERATOR_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ZARIGANI_GENERATOR_EMOTION_TAGGED") {
            self.generator.emotion_tagged =
                parse_bool("ZARIGANI_GENERATOR_EMOTION_TAGGED", &value)?;
        }

        let log_level =
            read_env("ZARIGANI_LOGGING_LEVEL").or_else(|| read_env("ZARIGANI_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ZARIGANI_LOGGING_FORMAT").or_else(|| read_env("ZARIGANI_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(db_file_path) = overrides.db_file_path {
            self.catalog.db_file_path = db_file_path;
        }
        if let Some(images_dir) = overrides.images_dir {
            self.catalog.images_dir = images_dir;
        }
        if let Some(admin_credential) = overrides.admin_credential {
            self.admin.credential = secret_value(admin_credential);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(generator_provider) = overrides.generator_provider {
            self.generator.provider = generator_provider;
        }
        if let Some(slack_webhook_url) = overrides.slack_webhook_url {
            self.slack.webhook_url = Some(slack_webhook_url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_catalog(&self.catalog)?;
        validate_admin(&self.admin)?;
        validate_slack(&self.slack)?;
        validate_generator(&self.generator)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Candidate config file locations, in lookup order.
pub fn default_config_paths() -> [PathBuf; 2] {
    [PathBuf::from("zarigani.toml"), PathBuf::from("config/zarigani.toml")]
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    default_config_paths().into_iter().find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.db_file_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "catalog.db_file_path must not be empty".to_string(),
        ));
    }

    if catalog.images_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.images_dir must not be empty".to_string()));
    }

    if catalog.max_file_size_bytes == 0 {
        return Err(ConfigError::Validation(
            "catalog.max_file_size_bytes must be greater than zero".to_string(),
        ));
    }

    if catalog.cache_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "catalog.cache_ttl_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_admin(admin: &AdminConfig) -> Result<(), ConfigError> {
    let credential = admin.credential.expose_secret();
    if credential.trim().is_empty() {
        return Err(ConfigError::Validation(
            "admin.credential is required. Set ZARIGANI_ADMIN_CREDENTIAL to the shared secret used by the admin client".to_string(),
        ));
    }

    Ok(())
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if let Some(webhook_url) = &slack.webhook_url {
        if !webhook_url.starts_with("https://") && !webhook_url.starts_with("http://") {
            return Err(ConfigError::Validation(
                "slack.webhook_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if !slack.enabled {
        return Ok(());
    }

    let bot_token = slack.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "slack.bot_token is required when slack.enabled is true. Get it from https://api.slack.com/apps > Your App > OAuth & Permissions > Bot User OAuth Token".to_string()
        ));
    }
    if !bot_token.starts_with("xoxb-") {
        return Err(ConfigError::Validation(
            "slack.bot_token must start with `xoxb-`. Get it from https://api.slack.com/apps"
                .to_string(),
        ));
    }

    if slack.signing_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.signing_secret is required when slack.enabled is true. Get it from https://api.slack.com/apps > Your App > Basic Information > Signing Secret".to_string()
        ));
    }

    Ok(())
}

fn validate_generator(generator: &GeneratorConfig) -> Result<(), ConfigError> {
    if generator.timeout_secs == 0 || generator.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "generator.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if generator.provider.requires_api_key() {
        let missing = generator
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(format!(
                "generator.api_key is required for the `{}` provider",
                generator.provider.as_str()
            )));
        }
    }

    if let Some(base_url) = &generator.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "generator.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    catalog: Option<CatalogPatch>,
    admin: Option<AdminPatch>,
    slack: Option<SlackPatch>,
    generator: Option<GeneratorPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    allowed_origin_hosts: Option<Vec<String>>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    db_file_path: Option<PathBuf>,
    images_dir: Option<PathBuf>,
    max_file_size_bytes: Option<u64>,
    cache_ttl_secs: Option<u64>,
    dictionary_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminPatch {
    credential: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    enabled: Option<bool>,
    bot_token: Option<String>,
    signing_secret: Option<String>,
    webhook_url: Option<String>,
    app_id: Option<String>,
    install_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeneratorPatch {
    provider: Option<GeneratorProvider>,
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    emotion_tagged: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
