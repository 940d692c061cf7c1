//! User service for registration and sign-in

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{validate_password, validate_username, User, UserId, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// User service for registration and authentication
#[derive(Debug)]
pub struct UserService<R: UserRepository + ?Sized, H: PasswordHasher + ?Sized> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository + ?Sized, H: PasswordHasher + ?Sized> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    ///
    /// The existence check and the insert are separate store calls, so two
    /// concurrent registrations of one username can both pass the check.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .repository
            .create(User::new(UserId::generate(), username, password_hash))
            .await?;

        info!(user_id = %user.id(), username = %user.username(), "User registered");
        Ok(user)
    }

    /// Check a username/password pair, `None` when either is wrong
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = match self.repository.get_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        Ok(Some(user))
    }
}
