//! Storage factory for runtime store selection

use std::sync::Arc;

use crate::domain::recipe::RecipeRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::recipe::{InMemoryRecipeRepository, MongoRecipeRepository};
use crate::infrastructure::user::{InMemoryUserRepository, MongoUserRepository};

use super::mongo::{MongoConfig, MongoStore};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageType {
    /// In-process storage (for testing/development)
    #[default]
    InMemory,
    Mongo,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => write!(f, "in_memory"),
            Self::Mongo => write!(f, "mongodb"),
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: in_memory, mongodb",
                s
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Mongo(MongoConfig),
}

impl StorageConfig {
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Mongo(_) => StorageType::Mongo,
        }
    }
}

/// Repositories sharing one store backend
#[derive(Debug, Clone)]
pub struct Repositories {
    pub recipes: Arc<dyn RecipeRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Factory for creating store-backed repositories
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Connect to the configured store and build its repositories
    pub async fn create(config: &StorageConfig) -> Result<Repositories, DomainError> {
        match config {
            StorageConfig::InMemory => Ok(Self::in_memory()),
            StorageConfig::Mongo(mongo_config) => {
                let store = MongoStore::connect(mongo_config).await?;
                Ok(Repositories {
                    users: Arc::new(MongoUserRepository::new(&store)),
                    recipes: Arc::new(MongoRecipeRepository::new(store)),
                })
            }
        }
    }

    pub fn in_memory() -> Repositories {
        Repositories {
            recipes: Arc::new(InMemoryRecipeRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }
}
