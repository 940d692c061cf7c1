//! Authentication domain
//!
//! The identity a gate attaches to an authorized request, and the errors a
//! gate can reject with.

use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;

/// Which gate strategy authorized a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    Session,
    SignedToken,
    Federated,
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "api_key"),
            Self::Session => write!(f, "session"),
            Self::SignedToken => write!(f, "signed_token"),
            Self::Federated => write!(f, "federated"),
        }
    }
}

/// The caller a gate let through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Username, token subject, or a fixed label for API-key callers
    pub subject: String,
    pub method: AuthMethod,
}

impl Identity {
    pub fn new(subject: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            subject: subject.into(),
            method,
        }
    }
}

/// Reasons a gate rejects a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingCredential(String),

    #[error("{0}")]
    InvalidCredential(String),

    /// No live session for the request
    #[error("Not logged")]
    NotLoggedIn,

    #[error(transparent)]
    Backend(#[from] DomainError),
}

impl AuthError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingCredential(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCredential(message.into())
    }
}
