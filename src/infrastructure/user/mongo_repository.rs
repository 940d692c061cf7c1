//! MongoDB user repository implementation

use async_trait::async_trait;
use chrono::DateTime;
use mongodb::bson::{self, doc};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::MongoStore;

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    /// Hash in the format of the configured hasher
    password: String,
    #[serde(default)]
    created_at: Option<bson::DateTime>,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            password: user.password_hash().to_string(),
            created_at: Some(bson::DateTime::from_millis(
                user.created_at().timestamp_millis(),
            )),
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        let created_at = document
            .created_at
            .and_then(|at| DateTime::from_timestamp_millis(at.timestamp_millis()))
            .unwrap_or_default();

        User::restore(
            UserId::new(document.id),
            document.username,
            document.password,
            created_at,
        )
    }
}

/// User repository backed by a MongoDB collection
///
/// No unique index is created on `username`; uniqueness relies on the
/// registration pre-check.
#[derive(Debug, Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.database().collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let document = self
            .collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        Ok(document.map(User::from))
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.collection
            .insert_one(UserDocument::from(&user))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create user: {}", e)))?;

        Ok(user)
    }
}
