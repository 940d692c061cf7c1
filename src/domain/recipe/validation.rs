//! Recipe validation utilities

use thiserror::Error;

/// Errors that can occur during recipe validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecipeValidationError {
    #[error("Recipe ID cannot be empty")]
    EmptyId,

    #[error("Recipe ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Recipe ID contains invalid character: '{0}'")]
    InvalidIdCharacter(char),

    #[error("Recipe name cannot be empty")]
    EmptyName,

    #[error("Recipe name exceeds maximum length of {0} characters")]
    NameTooLong(usize),
}

const MAX_RECIPE_ID_LENGTH: usize = 64;
const MAX_RECIPE_NAME_LENGTH: usize = 200;

/// Validate a recipe ID
///
/// Ids are opaque, but they travel in URL paths and cache payloads, so they
/// must be non-empty, bounded, and free of whitespace and path separators.
pub fn validate_recipe_id(id: &str) -> Result<(), RecipeValidationError> {
    if id.is_empty() {
        return Err(RecipeValidationError::EmptyId);
    }

    if id.len() > MAX_RECIPE_ID_LENGTH {
        return Err(RecipeValidationError::IdTooLong(MAX_RECIPE_ID_LENGTH));
    }

    if let Some(c) = id.chars().find(|c| c.is_whitespace() || *c == '/') {
        return Err(RecipeValidationError::InvalidIdCharacter(c));
    }

    Ok(())
}

/// Validate a recipe name
pub fn validate_recipe_name(name: &str) -> Result<(), RecipeValidationError> {
    if name.trim().is_empty() {
        return Err(RecipeValidationError::EmptyName);
    }

    if name.chars().count() > MAX_RECIPE_NAME_LENGTH {
        return Err(RecipeValidationError::NameTooLong(MAX_RECIPE_NAME_LENGTH));
    }

    Ok(())
}
