//! Recipe repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{NewRecipe, Recipe, RecipeId, RecipeUpdate};
use crate::domain::DomainError;

/// Durable storage for recipes
///
/// Implementations assign the identifier on insert and must return recipes
/// from `list` in insertion order.
#[async_trait]
pub trait RecipeRepository: Send + Sync + Debug {
    /// Persist a new recipe, assigning its identifier
    async fn insert(
        &self,
        recipe: NewRecipe,
        published_at: DateTime<Utc>,
    ) -> Result<Recipe, DomainError>;

    /// All recipes in insertion order
    async fn list(&self) -> Result<Vec<Recipe>, DomainError>;

    /// Point lookup by identifier
    async fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, DomainError>;

    /// Overwrite the mutable fields, returns true if a recipe matched
    async fn update(&self, id: &RecipeId, update: &RecipeUpdate) -> Result<bool, DomainError>;

    /// Remove by identifier, returns true if a recipe was removed
    async fn delete(&self, id: &RecipeId) -> Result<bool, DomainError>;

    /// Verify the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Keep the recipes carrying `tag`; an empty tag keeps everything
pub fn filter_by_tag(recipes: Vec<Recipe>, tag: &str) -> Vec<Recipe> {
    if tag.is_empty() {
        return recipes;
    }

    recipes.into_iter().filter(|r| r.has_tag(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: &str, tags: &[&str]) -> Recipe {
        Recipe::from_new(
            RecipeId::new(id).unwrap(),
            NewRecipe::new(id).with_tags(tags.iter().copied()),
            Utc::now(),
        )
    }

    #[test]
    fn test_filter_by_tag_case_insensitive() {
        let recipes = vec![
            recipe("pasta", &["italian"]),
            recipe("tacos", &["Mexican"]),
        ];

        let found = filter_by_tag(recipes, "Italian");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_str(), "pasta");
    }

    #[test]
    fn test_filter_by_empty_tag_returns_all() {
        let recipes = vec![recipe("pasta", &["italian"]), recipe("plain", &[])];

        let found = filter_by_tag(recipes.clone(), "");
        assert_eq!(found, recipes);
    }

    #[test]
    fn test_filter_preserves_order() {
        let recipes = vec![
            recipe("a", &["quick"]),
            recipe("b", &["slow"]),
            recipe("c", &["QUICK"]),
        ];

        let ids: Vec<String> = filter_by_tag(recipes, "quick")
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
