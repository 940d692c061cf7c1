//! HS256 signed token issuance, validation and refresh

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Claim bundle carried by a signed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub username: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(username: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            username: username.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// Time left before expiry, negative once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        Duration::seconds(self.exp - now.timestamp())
    }
}

/// A freshly signed token and its expiry, as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Configuration for the signed token service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Lifetime of issued tokens
    pub expiration: Duration,
    /// Tokens may only be refreshed once less than this much validity is left
    pub refresh_window: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration: Duration::hours(1),
            refresh_window: Duration::minutes(1),
        }
    }
}

/// Issues and validates HS256 tokens signed with a server secret
#[derive(Clone)]
pub struct SignedTokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for SignedTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedTokenService")
            .field("expiration", &self.config.expiration)
            .field("refresh_window", &self.config.refresh_window)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl SignedTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign a token for `username` valid for the configured lifetime
    pub fn issue(&self, username: &str) -> Result<IssuedToken, DomainError> {
        let now = Utc::now();
        let claims = TokenClaims::new(username, now, self.config.expiration);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        let expires = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now + self.config.expiration);

        Ok(IssuedToken { token, expires })
    }

    /// Verify signature and expiry with zero leeway
    pub fn validate(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::unauthorized(format!("Invalid token: {}", e)))
    }

    /// Exchange a token that is about to expire for a new one
    ///
    /// Fails with a validation error while at least `refresh_window` of
    /// validity remains.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, DomainError> {
        let claims = self.validate(token)?;

        if claims.remaining(Utc::now()) >= self.config.refresh_window {
            return Err(DomainError::validation("Token is not expired yet"));
        }

        self.issue(&claims.username)
    }
}

/// Strip an optional `Bearer ` scheme from an Authorization header value
pub fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => value,
    }
}
