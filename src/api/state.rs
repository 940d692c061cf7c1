//! Application state for shared services

use std::sync::Arc;

use crate::api::middleware::AuthGate;
use crate::domain::recipe::RecipeRepository;
use crate::domain::user::UserRepository;
use crate::domain::{Cache, DomainError, NewRecipe, Recipe, RecipeUpdate, User};
use crate::infrastructure::auth::{SessionStore, SignedTokenService};
use crate::infrastructure::recipe::RecipeService;
use crate::infrastructure::user::{PasswordHasher, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub recipe_service: Arc<dyn RecipeServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub sessions: Arc<SessionStore>,
    pub tokens: Arc<SignedTokenService>,
    pub gate: AuthGate,
    pub cache: Arc<dyn Cache>,
    /// Set the `Secure` attribute on the session cookie
    pub cookie_secure: bool,
}

/// Trait for recipe service operations
#[async_trait::async_trait]
pub trait RecipeServiceTrait: Send + Sync {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, DomainError>;
    async fn list(&self) -> Result<Vec<Recipe>, DomainError>;
    async fn update(&self, id: &str, update: RecipeUpdate) -> Result<(), DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn search_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, DomainError>;
    /// Reach the backing store
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
}

#[async_trait::async_trait]
impl<R: RecipeRepository + ?Sized + 'static> RecipeServiceTrait for RecipeService<R> {
    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, DomainError> {
        RecipeService::create(self, recipe).await
    }

    async fn list(&self) -> Result<Vec<Recipe>, DomainError> {
        RecipeService::list(self).await
    }

    async fn update(&self, id: &str, update: RecipeUpdate) -> Result<(), DomainError> {
        RecipeService::update(self, id, update).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        RecipeService::delete(self, id).await
    }

    async fn search_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, DomainError> {
        RecipeService::search_by_tag(self, tag).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, DomainError> {
        RecipeService::find_by_id(self, id).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        RecipeService::ping(self).await
    }
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + ?Sized + 'static,
    H: PasswordHasher + ?Sized + 'static,
{
    async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        UserService::register(self, username, password).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }
}
