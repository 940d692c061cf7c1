//! Flat environment variables from earlier deployments

use std::collections::HashMap;

use config::{ConfigError, Map, Source, Value};

/// Variables understood by this source
pub const LEGACY_VARS: &[&str] = &[
    "MONGO_URI",
    "MONGO_DATABASE",
    "REDIS_PORT",
    "JWT_SECRET",
    "X_API_KEY",
    "AUTH0_DOMAIN",
    "AUTH0_API_IDENTIFIER",
];

/// Maps the flat variables onto nested configuration keys
///
/// Setting `MONGO_URI` or `REDIS_PORT` also selects the matching backend.
/// `APP__*` variables are layered above this source and still win.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    vars: HashMap<String, String>,
}

impl LegacyEnv {
    /// Read the legacy variables from the process environment
    pub fn from_process() -> Self {
        let vars = LEGACY_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        Self { vars }
    }

    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl Source for LegacyEnv {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = "legacy environment".to_string();
        let mut map = Map::new();
        let mut put = |key: &str, value: String| {
            map.insert(key.to_string(), Value::new(Some(&origin), value));
        };

        if let Some(uri) = self.get("MONGO_URI") {
            put("store.backend", "mongodb".to_string());
            put("store.uri", uri.to_string());
        }
        if let Some(database) = self.get("MONGO_DATABASE") {
            put("store.database", database.to_string());
        }
        if let Some(port) = self.get("REDIS_PORT") {
            put("cache.backend", "redis".to_string());
            put("cache.url", format!("redis://localhost:{}", port));
        }
        if let Some(secret) = self.get("JWT_SECRET") {
            put("auth.jwt_secret", secret.to_string());
        }
        if let Some(key) = self.get("X_API_KEY") {
            put("auth.api_key", key.to_string());
        }
        if let Some(domain) = self.get("AUTH0_DOMAIN") {
            put("auth0.domain", domain.to_string());
        }
        if let Some(audience) = self.get("AUTH0_API_IDENTIFIER") {
            put("auth0.audience", audience.to_string());
        }

        Ok(map)
    }
}
