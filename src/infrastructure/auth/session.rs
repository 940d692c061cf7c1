//! Cache-backed cookie sessions

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::DomainError;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "recipes_api";

/// What the cache stores for a live session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Creates, resolves and destroys session records in the cache
#[derive(Debug, Clone)]
pub struct SessionStore {
    cache: Arc<dyn Cache>,
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn Cache>, ttl: Option<Duration>) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Start a session for `username`, returning the opaque cookie token
    pub async fn create(&self, username: &str) -> Result<String, DomainError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let record = SessionRecord {
            username: username.to_string(),
            created_at: Utc::now(),
        };

        self.cache.set(&Self::key(&token), &record, self.ttl).await?;
        Ok(token)
    }

    pub async fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, DomainError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.cache.get(&Self::key(token)).await
    }

    /// Remove a session, returns true if it existed
    pub async fn destroy(&self, token: &str) -> Result<bool, DomainError> {
        self.cache.delete(&Self::key(token)).await
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}
