//! In-memory recipe repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::recipe::{NewRecipe, Recipe, RecipeId, RecipeRepository, RecipeUpdate};
use crate::domain::DomainError;

/// In-memory implementation of RecipeRepository
///
/// Recipes are kept in a vector so `list` naturally returns insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Arc<RwLock<Vec<Recipe>>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id() -> Result<RecipeId, DomainError> {
        RecipeId::new(uuid::Uuid::new_v4().to_string())
            .map_err(|e| DomainError::internal(format!("Generated invalid recipe id: {}", e)))
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn insert(
        &self,
        recipe: NewRecipe,
        published_at: DateTime<Utc>,
    ) -> Result<Recipe, DomainError> {
        let recipe = Recipe::from_new(Self::generate_id()?, recipe, published_at);
        self.recipes.write().await.push(recipe.clone());
        Ok(recipe)
    }

    async fn list(&self) -> Result<Vec<Recipe>, DomainError> {
        Ok(self.recipes.read().await.clone())
    }

    async fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, DomainError> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().find(|r| &r.id == id).cloned())
    }

    async fn update(&self, id: &RecipeId, update: &RecipeUpdate) -> Result<bool, DomainError> {
        let mut recipes = self.recipes.write().await;

        match recipes.iter_mut().find(|r| &r.id == id) {
            Some(recipe) => {
                recipe.apply(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, DomainError> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|r| &r.id != id);
        Ok(recipes.len() < before)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let repo = InMemoryRecipeRepository::new();

        let a = repo.insert(NewRecipe::new("Pizza"), Utc::now()).await.unwrap();
        let b = repo.insert(NewRecipe::new("Pizza"), Utc::now()).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let repo = InMemoryRecipeRepository::new();

        for name in ["first", "second", "third"] {
            repo.insert(NewRecipe::new(name), Utc::now()).await.unwrap();
        }

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let repo = InMemoryRecipeRepository::new();
        let created = repo
            .insert(
                NewRecipe::new("Pizza")
                    .with_tags(["italian"])
                    .with_picture("http://img/pizza.png"),
                Utc::now(),
            )
            .await
            .unwrap();

        let update = RecipeUpdate {
            name: "Margherita".to_string(),
            instructions: vec!["bake".to_string()],
            ingredients: vec!["dough".to_string()],
            tags: vec![],
        };
        assert!(repo.update(&created.id, &update).await.unwrap());

        let stored = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Margherita");
        assert!(stored.tags.is_empty());
        assert_eq!(stored.picture.as_deref(), Some("http://img/pizza.png"));
        assert_eq!(stored.published_at, created.published_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let repo = InMemoryRecipeRepository::new();
        let id = RecipeId::new("nope").unwrap();

        assert!(!repo.update(&id, &RecipeUpdate::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryRecipeRepository::new();
        let created = repo.insert(NewRecipe::new("Pizza"), Utc::now()).await.unwrap();

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(!repo.delete(&created.id).await.unwrap());
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }
}
