//! Domain layer - Core business logic and entities

pub mod auth;
pub mod cache;
pub mod error;
pub mod recipe;
pub mod user;

pub use auth::{AuthError, AuthMethod, Identity};
pub use cache::{Cache, CacheExt};
pub use error::DomainError;
pub use recipe::{NewRecipe, Recipe, RecipeId, RecipeRepository, RecipeUpdate};
pub use user::{User, UserId, UserRepository};
