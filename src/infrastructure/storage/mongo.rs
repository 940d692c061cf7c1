//! MongoDB connection bootstrap

use std::fmt;
use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::domain::DomainError;

/// MongoDB connection settings
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`
    pub uri: String,
    pub database: String,
    /// Bound on opening a socket and on the startup ping
    pub connect_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "demo".to_string(),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Handle to the configured MongoDB database
///
/// The driver pools connections internally, so clones share one pool.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .finish()
    }
}

impl MongoStore {
    /// Connects and pings the server, failing within the configured timeout
    pub async fn connect(config: &MongoConfig) -> Result<Self, DomainError> {
        let options = client_options(config).await?;
        let client = Client::with_options(options)
            .map_err(|e| DomainError::storage(format!("Failed to create MongoDB client: {}", e)))?;

        let store = Self {
            database: client.database(&config.database),
        };

        tokio::time::timeout(config.connect_timeout, store.ping())
            .await
            .map_err(|_| {
                DomainError::storage(format!(
                    "Timed out connecting to MongoDB after {:?}",
                    config.connect_timeout
                ))
            })??;

        Ok(store)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DomainError::storage(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }
}

/// Driver options for `config`; server selection keeps the driver default
async fn client_options(config: &MongoConfig) -> Result<ClientOptions, DomainError> {
    let mut options = ClientOptions::parse(&config.uri)
        .await
        .map_err(|e| DomainError::storage(format!("Invalid MongoDB URI: {}", e)))?;

    options.connect_timeout = Some(config.connect_timeout);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MongoConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_invalid_uri_is_rejected() {
        let config = MongoConfig::new("not-a-uri", "demo");
        let err = MongoStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_short_timeout_only_applies_to_connecting() {
        let config = MongoConfig::new("mongodb://localhost:27017", "demo")
            .with_connect_timeout(Duration::from_secs(3));

        let options = client_options(&config).await.unwrap();

        assert_eq!(options.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.server_selection_timeout, None);
    }

    #[tokio::test]
    #[ignore = "Requires running MongoDB instance"]
    async fn test_connect_and_ping() {
        let store = MongoStore::connect(&MongoConfig::new("mongodb://localhost:27017", "demo_test"))
            .await
            .unwrap();
        assert!(store.ping().await.is_ok());
    }
}
