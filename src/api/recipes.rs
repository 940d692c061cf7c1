//! Recipe endpoints

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Identity, NewRecipe, Recipe, RecipeUpdate};

/// Acknowledgement body for writes that return no recipe
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub tag: Option<String>,
}

/// GET /recipes
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.recipe_service.list().await?;
    debug!(count = recipes.len(), "Listed recipes");
    Ok(Json(recipes))
}

/// POST /recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<NewRecipe>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state.recipe_service.create(request).await?;

    info!(recipe_id = %recipe.id, subject = %identity.subject, "Recipe created");
    Ok(Json(recipe))
}

/// PUT /recipes/{id}
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(request): Json<RecipeUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.recipe_service.update(&id, request).await?;

    info!(recipe_id = %id, subject = %identity.subject, "Recipe updated");
    Ok(Json(MessageResponse::new("Recipe has been updated")))
}

/// DELETE /recipes/{id}
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.recipe_service.delete(&id).await? {
        return Err(ApiError::not_found(format!("Recipe '{}' not found", id)));
    }

    info!(recipe_id = %id, subject = %identity.subject, "Recipe deleted");
    Ok(Json(MessageResponse::new("Recipe has been deleted")))
}

/// GET /recipes/search?tag=
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let tag = query.tag.unwrap_or_default();
    let recipes = state.recipe_service.search_by_tag(&tag).await?;
    Ok(Json(recipes))
}

/// GET /recipes/search/{id}
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    state
        .recipe_service
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Recipe '{}' not found", id)))
}
