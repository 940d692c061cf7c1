use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::legacy_env::LegacyEnv;
use super::remote::fetch_remote_document;

const REDACTED: &str = "***";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreSettings,
    pub cache: CacheSettings,
    pub auth: AuthConfig,
    pub auth0: Auth0Config,
    pub remote_config: RemoteConfigSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Document store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// `in_memory` or `mongodb`
    pub backend: String,
    pub uri: String,
    pub database: String,
    pub connect_timeout_secs: u64,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `in_memory` or `redis`
    pub backend: String,
    /// Redis URL
    pub url: String,
    pub key_prefix: Option<String>,
    /// TTL of the cached recipe list, 0 keeps it until the next write
    pub ttl_secs: u64,
    /// Entry limit of the in-process cache
    pub max_capacity: u64,
}

/// Gate and credential settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `api_key`, `session`, `jwt` or `auth0`
    pub strategy: String,
    pub api_key: String,
    pub jwt_secret: String,
    /// Lifetime of session records, 0 keeps them until sign-out
    pub session_ttl_secs: u64,
    /// Guard `GET /recipes` with the configured gate
    pub protect_list: bool,
    /// `bcrypt`, `argon2` or `legacy_sha256`
    pub password_scheme: String,
    pub bcrypt_cost: u32,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Auth0Config {
    pub domain: String,
    /// API identifier, checked as the token audience
    pub audience: String,
    pub jwks_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfigSettings {
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Abort startup when the document cannot be fetched
    pub required: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            uri: "mongodb://localhost:27017".to_string(),
            database: "demo".to_string(),
            connect_timeout_secs: 3,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            url: "redis://localhost:6379".to_string(),
            key_prefix: None,
            ttl_secs: 0,
            max_capacity: 10_000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategy: "jwt".to_string(),
            api_key: String::new(),
            jwt_secret: String::new(),
            session_ttl_secs: 86_400,
            protect_list: true,
            password_scheme: "bcrypt".to_string(),
            bcrypt_cost: 10,
            cookie_secure: false,
        }
    }
}

impl Default for RemoteConfigSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 3,
            required: false,
        }
    }
}

impl StoreSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Option<Duration> {
        secs_or_forever(self.ttl_secs)
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Option<Duration> {
        secs_or_forever(self.session_ttl_secs)
    }
}

fn secs_or_forever(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl AppConfig {
    /// Load configuration from every source, including the remote document
    pub async fn load() -> Result<LoadedConfig, ConfigError> {
        load_dotenv();
        ConfigLoader::new().load().await
    }

    /// Copy with secrets replaced, safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        redact(&mut config.auth.api_key);
        redact(&mut config.auth.jwt_secret);
        config.store.uri = redact_uri(&config.store.uri);
        config.cache.url = redact_uri(&config.cache.url);
        config
    }
}

fn redact(secret: &mut String) {
    if !secret.is_empty() {
        *secret = REDACTED.to_string();
    }
}

/// Hide the userinfo part of a connection URI
fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}{}{}", &uri[..scheme_end + 3], REDACTED, &uri[at..])
        }
        _ => uri.to_string(),
    }
}

/// Load the dotenv file named by `ENV`, falling back to `.env`
fn load_dotenv() {
    let name = std::env::var("ENV")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "dev.env".to_string());

    if dotenvy::from_filename(&name).is_err() {
        dotenvy::dotenv().ok();
    }
}

/// Result of a full load
///
/// `remote_fallback` holds the reason an optional remote document was
/// skipped. Loading runs before logging is set up, so the caller reports it
/// once a subscriber exists.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub remote_fallback: Option<String>,
}

impl LoadedConfig {
    fn local(config: AppConfig) -> Self {
        Self {
            config,
            remote_fallback: None,
        }
    }

    pub fn log_remote_fallback(&self) {
        if let Some(reason) = &self.remote_fallback {
            warn!(error = %reason, "Remote configuration unavailable, using local sources");
        }
    }
}

/// Layers configuration sources, lowest precedence first:
/// files, remote document, legacy variables, `APP__*` variables
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    files: Vec<String>,
    legacy: LegacyEnv,
    environment: Option<Map<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading `config/default`, `config/local` and the process environment
    pub fn new() -> Self {
        Self {
            files: vec!["config/default".to_string(), "config/local".to_string()],
            legacy: LegacyEnv::from_process(),
            environment: None,
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_legacy(mut self, legacy: LegacyEnv) -> Self {
        self.legacy = legacy;
        self
    }

    /// Use `vars` instead of the process environment for `APP__*` keys
    pub fn with_environment(mut self, vars: Map<String, String>) -> Self {
        self.environment = Some(vars);
        self
    }

    fn builder(&self, remote: Option<&str>) -> ConfigBuilder<config::builder::DefaultState> {
        let mut builder = Config::builder();

        for file in &self.files {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        if let Some(document) = remote {
            builder = builder.add_source(File::from_str(document, FileFormat::Json));
        }

        builder
            .add_source(self.legacy.clone())
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.environment.clone()),
            )
    }

    /// Load without consulting the remote document
    pub fn load_local(&self) -> Result<AppConfig, ConfigError> {
        self.builder(None).build()?.try_deserialize()
    }

    /// Load, merging the remote document when `remote_config.url` is set
    pub async fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let local = self.load_local()?;

        let Some(url) = local.remote_config.url.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(LoadedConfig::local(local));
        };

        let timeout = Duration::from_secs(local.remote_config.timeout_secs);
        match fetch_remote_document(url, timeout).await {
            Ok(document) => Ok(LoadedConfig::local(
                self.builder(Some(&document)).build()?.try_deserialize()?,
            )),
            Err(e) if local.remote_config.required => Err(e),
            Err(e) => Ok(LoadedConfig {
                config: local,
                remote_fallback: Some(e.to_string()),
            }),
        }
    }
}
