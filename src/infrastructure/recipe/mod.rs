//! Recipe infrastructure module
//!
//! Store backends for recipes and the service that fronts them with the
//! list cache.

mod in_memory;
mod mongo_repository;
mod service;

pub use in_memory::InMemoryRecipeRepository;
pub use mongo_repository::{MongoRecipeRepository, RECIPES_COLLECTION};
pub use service::{RecipeService, RECIPES_CACHE_KEY};
