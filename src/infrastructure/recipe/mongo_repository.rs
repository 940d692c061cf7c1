//! MongoDB recipe repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::domain::recipe::{
    truncate_to_millis, NewRecipe, Recipe, RecipeId, RecipeRepository, RecipeUpdate,
};
use crate::domain::DomainError;
use crate::infrastructure::storage::MongoStore;

/// Collection holding recipe documents
pub const RECIPES_COLLECTION: &str = "recipes";

/// Document layout of a recipe in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    instructions: Vec<String>,
    published_at: bson::DateTime,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
}

impl RecipeDocument {
    fn from_new(id: ObjectId, recipe: NewRecipe, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: recipe.name,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            published_at: bson::DateTime::from_millis(published_at.timestamp_millis()),
            picture: recipe.picture,
        }
    }

    fn into_recipe(self) -> Result<Recipe, DomainError> {
        let id = RecipeId::new(self.id.to_hex())
            .map_err(|e| DomainError::storage(format!("Stored recipe has invalid id: {}", e)))?;
        let published_at = DateTime::from_timestamp_millis(self.published_at.timestamp_millis())
            .ok_or_else(|| DomainError::storage("Stored recipe has out-of-range publishedAt"))?;

        Ok(Recipe {
            id,
            name: self.name,
            tags: self.tags,
            ingredients: self.ingredients,
            instructions: self.instructions,
            published_at: truncate_to_millis(published_at),
            picture: self.picture,
        })
    }
}

/// Recipe repository backed by a MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoRecipeRepository {
    store: MongoStore,
    collection: Collection<RecipeDocument>,
}

impl MongoRecipeRepository {
    pub fn new(store: MongoStore) -> Self {
        let collection = store.database().collection(RECIPES_COLLECTION);
        Self { store, collection }
    }

    fn parse_object_id(id: &RecipeId) -> Result<ObjectId, DomainError> {
        ObjectId::parse_str(id.as_str()).map_err(|_| {
            DomainError::invalid_id(format!("'{}' is not a valid recipe id", id))
        })
    }
}

#[async_trait]
impl RecipeRepository for MongoRecipeRepository {
    async fn insert(
        &self,
        recipe: NewRecipe,
        published_at: DateTime<Utc>,
    ) -> Result<Recipe, DomainError> {
        let document = RecipeDocument::from_new(ObjectId::new(), recipe, published_at);

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert recipe: {}", e)))?;

        document.into_recipe()
    }

    async fn list(&self) -> Result<Vec<Recipe>, DomainError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "publishedAt": 1, "_id": 1 })
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query recipes: {}", e)))?;

        let documents: Vec<RecipeDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read recipes: {}", e)))?;

        documents.into_iter().map(RecipeDocument::into_recipe).collect()
    }

    async fn get(&self, id: &RecipeId) -> Result<Option<Recipe>, DomainError> {
        let object_id = Self::parse_object_id(id)?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get recipe '{}': {}", id, e)))?
            .map(RecipeDocument::into_recipe)
            .transpose()
    }

    async fn update(&self, id: &RecipeId, update: &RecipeUpdate) -> Result<bool, DomainError> {
        let object_id = Self::parse_object_id(id)?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": object_id },
                doc! {
                    "$set": {
                        "name": update.name.as_str(),
                        "instructions": update.instructions.clone(),
                        "ingredients": update.ingredients.clone(),
                        "tags": update.tags.clone(),
                    }
                },
            )
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update recipe '{}': {}", id, e)))?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, DomainError> {
        let object_id = Self::parse_object_id(id)?;

        let result = self
            .collection
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete recipe '{}': {}", id, e)))?;

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MongoConfig;

    #[test]
    fn test_document_round_trip_keeps_millis() {
        let now = Utc::now();
        let document = RecipeDocument::from_new(
            ObjectId::new(),
            NewRecipe::new("Pizza").with_tags(["italian"]),
            now,
        );
        let hex = document.id.to_hex();

        let recipe = document.into_recipe().unwrap();
        assert_eq!(recipe.id.as_str(), hex);
        assert_eq!(recipe.published_at, truncate_to_millis(now));
        assert_eq!(recipe.tags, vec!["italian"]);
    }

    #[test]
    fn test_document_uses_original_field_names() {
        let document = RecipeDocument::from_new(
            ObjectId::new(),
            NewRecipe::new("Pizza").with_picture("http://img"),
            Utc::now(),
        );

        let raw = bson::to_document(&document).unwrap();
        assert!(raw.contains_key("_id"));
        assert!(raw.contains_key("publishedAt"));
        assert!(raw.contains_key("imageURL"));
    }

    #[test]
    fn test_parse_object_id_rejects_non_hex() {
        let id = RecipeId::new("not-an-object-id").unwrap();
        let err = MongoRecipeRepository::parse_object_id(&id).unwrap_err();
        assert!(matches!(err, DomainError::InvalidId { .. }));
    }

    #[tokio::test]
    #[ignore = "Requires running MongoDB instance"]
    async fn test_mongo_crud() {
        let store = MongoStore::connect(&MongoConfig::new("mongodb://localhost:27017", "recipes_test"))
            .await
            .unwrap();
        let repo = MongoRecipeRepository::new(store);

        let created = repo.insert(NewRecipe::new("Pizza"), Utc::now()).await.unwrap();
        assert_eq!(repo.get(&created.id).await.unwrap(), Some(created.clone()));

        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }
}
