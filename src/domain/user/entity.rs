//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    id: UserId,
    /// Username for sign-in, unique across users
    username: String,
    /// Password hash in the format of the configured hasher
    #[serde(skip_serializing)]
    password_hash: String,
    /// Registration timestamp
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self::restore(id, username, password_hash, Utc::now())
    }

    /// Rebuild a user loaded from a store
    pub fn restore(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_user_getters() {
        let user = User::new(UserId::new("u1"), "chef", "hash");

        assert_eq!(user.id().as_str(), "u1");
        assert_eq!(user.username(), "chef");
        assert_eq!(user.password_hash(), "hash");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(UserId::new("u1"), "chef", "secret-hash");
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("chef"));
        assert!(!json.contains("secret-hash"));
    }
}
