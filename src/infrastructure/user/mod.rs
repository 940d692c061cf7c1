//! User infrastructure module
//!
//! Password hashing schemes, user store backends, and the user service.

mod mongo_repository;
mod password;
mod repository;
mod service;

pub use mongo_repository::{MongoUserRepository, USERS_COLLECTION};
pub use password::{
    Argon2Hasher, BcryptHasher, LegacySha256Hasher, PasswordHasher, PasswordScheme,
    MIN_BCRYPT_COST,
};
pub use repository::InMemoryUserRepository;
pub use service::UserService;
