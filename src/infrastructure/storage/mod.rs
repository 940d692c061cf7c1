//! Storage infrastructure - Store connection and backend selection

mod factory;
mod mongo;

pub use factory::{Repositories, StorageConfig, StorageFactory, StorageType};
pub use mongo::{MongoConfig, MongoStore};
