//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::User;
use crate::domain::DomainError;

/// Repository trait for user storage
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their username (exact match)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Check if a username exists
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock user repository for testing
    ///
    /// Unlike the in-memory repository, `create` performs no uniqueness check,
    /// so callers' own pre-insert checks can be observed in isolation.
    #[derive(Debug, Default)]
    pub struct MockUserRepository {
        users: Arc<RwLock<Vec<User>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        pub async fn len(&self) -> usize {
            self.users.read().await.len()
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users.iter().find(|u| u.username() == username).cloned())
        }

        async fn create(&self, user: User) -> Result<User, DomainError> {
            self.check_should_fail().await?;
            self.users.write().await.push(user.clone());
            Ok(user)
        }
    }
}
