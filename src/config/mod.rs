//! Application configuration

mod app_config;
mod legacy_env;
mod remote;

pub use app_config::{
    AppConfig, Auth0Config, AuthConfig, CacheSettings, ConfigLoader, LoadedConfig, LogFormat,
    LoggingConfig, RemoteConfigSettings, ServerConfig, StoreSettings,
};
pub use legacy_env::LegacyEnv;
pub use remote::fetch_remote_document;
