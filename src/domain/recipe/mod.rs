//! Recipe domain
//!
//! Recipe entities, validation, and the repository trait implemented by the
//! document store backends.

mod entity;
mod repository;
mod validation;

pub use entity::{truncate_to_millis, NewRecipe, Recipe, RecipeId, RecipeUpdate};
pub use repository::{filter_by_tag, RecipeRepository};
pub use validation::{validate_recipe_id, validate_recipe_name, RecipeValidationError};
