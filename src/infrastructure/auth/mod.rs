//! Authentication infrastructure module
//!
//! Signed token management, federated token verification and cookie
//! sessions.

mod jwks;
mod jwt;
mod session;

pub use jwks::{FederatedClaims, FederatedConfig, FederatedVerifier};
pub use jwt::{strip_bearer, IssuedToken, JwtConfig, SignedTokenService, TokenClaims};
pub use session::{SessionRecord, SessionStore, SESSION_COOKIE};
