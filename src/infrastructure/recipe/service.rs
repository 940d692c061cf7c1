//! Recipe service - CRUD and tag search with a read-through list cache

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::recipe::{filter_by_tag, NewRecipe, Recipe, RecipeId, RecipeRepository, RecipeUpdate};
use crate::domain::DomainError;

/// Cache key holding the serialized list of all recipes
pub const RECIPES_CACHE_KEY: &str = "recipes";

/// Recipe service coordinating the document store and the list cache
///
/// The cache holds a single snapshot of the whole collection. Every write
/// deletes it after the store call, so a `list` racing a write may refill
/// the snapshot with pre-write data until the next write.
#[derive(Debug)]
pub struct RecipeService<R: RecipeRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn Cache>,
    /// TTL of the cached list, `None` keeps it until the next write
    cache_ttl: Option<Duration>,
    last_published_ms: AtomicI64,
}

impl<R: RecipeRepository + ?Sized> RecipeService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn Cache>) -> Self {
        Self {
            repository,
            cache,
            cache_ttl: None,
            last_published_ms: AtomicI64::new(i64::MIN),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create a recipe stamped with the current publish time
    pub async fn create(&self, recipe: NewRecipe) -> Result<Recipe, DomainError> {
        recipe
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let published_at = self.next_publish_time();
        let created = self.repository.insert(recipe, published_at).await?;
        self.invalidate().await?;

        info!(recipe_id = %created.id, "Recipe created");
        Ok(created)
    }

    /// All recipes, served from the cache when a snapshot is present
    pub async fn list(&self) -> Result<Vec<Recipe>, DomainError> {
        match self.cache.get::<Vec<Recipe>>(RECIPES_CACHE_KEY).await {
            Ok(Some(recipes)) => {
                debug!(count = recipes.len(), "Recipe list served from cache");
                return Ok(recipes);
            }
            Ok(None) => debug!("Recipe list cache miss"),
            Err(e) => warn!(error = %e, "Recipe cache read failed, falling back to store"),
        }

        let recipes = self.repository.list().await?;

        if let Err(e) = self.cache.set(RECIPES_CACHE_KEY, &recipes, self.cache_ttl).await {
            warn!(error = %e, "Failed to refill recipe cache");
        }

        Ok(recipes)
    }

    /// Overwrite a recipe's mutable fields
    ///
    /// Succeeds whether or not a recipe with `id` exists.
    pub async fn update(&self, id: &str, update: RecipeUpdate) -> Result<(), DomainError> {
        let recipe_id = Self::parse_recipe_id(id)?;

        let matched = self.repository.update(&recipe_id, &update).await?;
        self.invalidate().await?;

        if !matched {
            debug!(recipe_id = %recipe_id, "Update matched no recipe");
        }

        Ok(())
    }

    /// Delete a recipe, returns false if nothing was removed
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let recipe_id = Self::parse_recipe_id(id)?;

        let deleted = self.repository.delete(&recipe_id).await?;
        self.invalidate().await?;

        if deleted {
            info!(recipe_id = %recipe_id, "Recipe deleted");
        }

        Ok(deleted)
    }

    /// Recipes carrying `tag` (case-insensitive); an empty tag returns all
    pub async fn search_by_tag(&self, tag: &str) -> Result<Vec<Recipe>, DomainError> {
        let recipes = self.list().await?;
        Ok(filter_by_tag(recipes, tag))
    }

    /// Point lookup straight from the store
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, DomainError> {
        let recipe_id = Self::parse_recipe_id(id)?;
        self.repository.get(&recipe_id).await
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn invalidate(&self) -> Result<(), DomainError> {
        self.cache.delete(RECIPES_CACHE_KEY).await.map_err(|e| {
            warn!(error = %e, "Failed to invalidate recipe cache");
            e
        })?;
        Ok(())
    }

    /// Wall-clock time, never earlier than a previously issued publish time
    fn next_publish_time(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let previous = self.last_published_ms.fetch_max(now, Ordering::SeqCst);

        DateTime::from_timestamp_millis(previous.max(now)).unwrap_or_else(Utc::now)
    }

    fn parse_recipe_id(id: &str) -> Result<RecipeId, DomainError> {
        RecipeId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
    }
}
