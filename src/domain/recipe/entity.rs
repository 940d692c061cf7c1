//! Recipe entity and related types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_recipe_id, validate_recipe_name, RecipeValidationError};

/// Opaque recipe identifier assigned by the store at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeId(String);

impl RecipeId {
    /// Create a new RecipeId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let id = id.into();
        validate_recipe_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecipeId {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecipeId> for String {
    fn from(id: RecipeId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored recipe
///
/// The JSON shape of this type is shared by API responses and the cached
/// recipe snapshot, so a value read from the cache serializes exactly like
/// the one read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Recipe {
    /// Build a stored recipe from creation input and a store-assigned id
    pub fn from_new(id: RecipeId, recipe: NewRecipe, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: recipe.name,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            published_at: truncate_to_millis(published_at),
            picture: recipe.picture,
        }
    }

    /// Overwrite the mutable fields with the values of an update
    pub fn apply(&mut self, update: &RecipeUpdate) {
        self.name = update.name.clone();
        self.instructions = update.instructions.clone();
        self.ingredients = update.ingredients.clone();
        self.tags = update.tags.clone();
    }

    /// Case-insensitive exact match against any of the recipe's tags
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| fold_eq(t, tag))
    }
}

/// Simple case folding compared char by char, so context-sensitive
/// lowercasing (a word-final `Σ` becoming `ς`) does not split matches
fn fold_eq(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(fold_char)
        .eq(b.chars().flat_map(fold_char))
}

fn fold_char(c: char) -> std::char::ToLowercase {
    match c {
        'ς' => 'σ'.to_lowercase(),
        _ => c.to_lowercase(),
    }
}

/// Input for creating a recipe
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default, alias = "steps")]
    pub instructions: Vec<String>,
    #[serde(rename = "imageURL", default)]
    pub picture: Option<String>,
}

impl NewRecipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_picture(mut self, url: impl Into<String>) -> Self {
        self.picture = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        validate_recipe_name(&self.name)
    }
}

/// Full overwrite of a recipe's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdate {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "steps")]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Stores keep millisecond precision, so timestamps are truncated up front
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}
