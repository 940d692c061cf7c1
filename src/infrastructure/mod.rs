//! Infrastructure layer - External service implementations

pub mod auth;
pub mod cache;
pub mod logging;
pub mod recipe;
pub mod storage;
pub mod user;
