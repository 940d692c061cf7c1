//! Authorization gates for the protected route group
//!
//! Exactly one strategy is active per deployment. A rejected request never
//! reaches the protected handler.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{AuthError, AuthMethod, DomainError, Identity};
use crate::infrastructure::auth::{
    strip_bearer, FederatedVerifier, SessionStore, SignedTokenService, SESSION_COOKIE,
};

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Subject recorded for callers let through by the API key gate
const API_KEY_SUBJECT: &str = "api-key";

/// Gate strategy names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateStrategy {
    ApiKey,
    Session,
    #[default]
    SignedToken,
    Federated,
}

impl std::fmt::Display for GateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "api_key"),
            Self::Session => write!(f, "session"),
            Self::SignedToken => write!(f, "jwt"),
            Self::Federated => write!(f, "auth0"),
        }
    }
}

impl FromStr for GateStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api_key" | "apikey" | "api-key" => Ok(Self::ApiKey),
            "session" | "cookie" => Ok(Self::Session),
            "jwt" | "signed_token" | "token" => Ok(Self::SignedToken),
            "auth0" | "federated" | "jwks" => Ok(Self::Federated),
            _ => Err(DomainError::configuration(format!(
                "Unknown auth strategy: {}. Valid strategies: api_key, session, jwt, auth0",
                s
            ))),
        }
    }
}

/// The configured gate with everything it needs to decide
#[derive(Debug, Clone)]
pub enum AuthGate {
    ApiKey { key: Arc<str> },
    Session(Arc<SessionStore>),
    SignedToken(Arc<SignedTokenService>),
    Federated(Arc<FederatedVerifier>),
}

impl AuthGate {
    pub fn api_key(key: impl AsRef<str>) -> Self {
        Self::ApiKey {
            key: Arc::from(key.as_ref()),
        }
    }

    pub fn strategy(&self) -> GateStrategy {
        match self {
            Self::ApiKey { .. } => GateStrategy::ApiKey,
            Self::Session(_) => GateStrategy::Session,
            Self::SignedToken(_) => GateStrategy::SignedToken,
            Self::Federated(_) => GateStrategy::Federated,
        }
    }

    /// Decide whether the request described by `headers` may proceed
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        match self {
            Self::ApiKey { key } => {
                let presented = headers
                    .get(API_KEY_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| AuthError::missing("API key not provided or invalid"))?;

                if key.is_empty() || presented != key.as_ref() {
                    return Err(AuthError::invalid("API key not provided or invalid"));
                }
                Ok(Identity::new(API_KEY_SUBJECT, AuthMethod::ApiKey))
            }
            Self::Session(sessions) => {
                let jar = CookieJar::from_headers(headers);
                let token = jar
                    .get(SESSION_COOKIE)
                    .map(|c| c.value().to_string())
                    .ok_or(AuthError::NotLoggedIn)?;

                let record = sessions
                    .lookup(&token)
                    .await?
                    .ok_or(AuthError::NotLoggedIn)?;
                Ok(Identity::new(record.username, AuthMethod::Session))
            }
            Self::SignedToken(tokens) => {
                let token = bearer_token(headers)?;
                let claims = tokens.validate(token).map_err(unauthorized)?;
                Ok(Identity::new(claims.username, AuthMethod::SignedToken))
            }
            Self::Federated(verifier) => {
                let token = bearer_token(headers)?;
                let claims = verifier.verify(token).await.map_err(unauthorized)?;
                Ok(Identity::new(claims.sub, AuthMethod::Federated))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(strip_bearer)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::missing("Authorization header required"))
}

fn unauthorized(err: DomainError) -> AuthError {
    match err {
        DomainError::Unauthorized { message } => AuthError::InvalidCredential(message),
        other => AuthError::Backend(other),
    }
}

/// Middleware applying the configured gate and recording the caller's identity
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state
        .gate
        .authorize(request.headers())
        .await
        .map_err(|e| {
            debug!(strategy = %state.gate.strategy(), error = %e, "Request rejected by gate");
            ApiError::from(e)
        })?;

    debug!(subject = %identity.subject, method = %identity.method, "Request authorized");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::infrastructure::auth::{FederatedConfig, JwtConfig};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("api_key".parse::<GateStrategy>().unwrap(), GateStrategy::ApiKey);
        assert_eq!("SESSION".parse::<GateStrategy>().unwrap(), GateStrategy::Session);
        assert_eq!("jwt".parse::<GateStrategy>().unwrap(), GateStrategy::SignedToken);
        assert_eq!("auth0".parse::<GateStrategy>().unwrap(), GateStrategy::Federated);
        assert!("basic".parse::<GateStrategy>().is_err());
    }

    #[tokio::test]
    async fn test_api_key_gate() {
        let gate = AuthGate::api_key("secret");

        let identity = gate
            .authorize(&headers(&[("x-api-key", "secret")]))
            .await
            .unwrap();
        assert_eq!(identity.method, AuthMethod::ApiKey);

        assert!(matches!(
            gate.authorize(&headers(&[("x-api-key", "wrong")])).await,
            Err(AuthError::InvalidCredential(_))
        ));
        assert!(matches!(
            gate.authorize(&HeaderMap::new()).await,
            Err(AuthError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_api_key_rejects_everything() {
        let gate = AuthGate::api_key("");

        assert!(gate.authorize(&headers(&[("x-api-key", "")])).await.is_err());
        assert!(gate.authorize(&headers(&[("x-api-key", "any")])).await.is_err());
    }

    #[tokio::test]
    async fn test_session_gate() {
        let sessions = Arc::new(SessionStore::new(Arc::new(MockCache::new()), None));
        let token = sessions.create("alice").await.unwrap();
        let gate = AuthGate::Session(sessions);

        let cookie = format!("{}={}", SESSION_COOKIE, token);
        let identity = gate.authorize(&headers(&[("cookie", cookie.as_str())])).await.unwrap();
        assert_eq!(identity.subject, "alice");
        assert_eq!(identity.method, AuthMethod::Session);

        let stale = format!("{}=unknown", SESSION_COOKIE);
        assert!(matches!(
            gate.authorize(&headers(&[("cookie", stale.as_str())])).await,
            Err(AuthError::NotLoggedIn)
        ));
        assert!(matches!(
            gate.authorize(&HeaderMap::new()).await,
            Err(AuthError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn test_session_gate_cache_failure_is_backend_error() {
        let sessions = SessionStore::new(Arc::new(MockCache::new().with_error("down")), None);
        let gate = AuthGate::Session(Arc::new(sessions));

        let cookie = format!("{}=abc", SESSION_COOKIE);
        assert!(matches!(
            gate.authorize(&headers(&[("cookie", cookie.as_str())])).await,
            Err(AuthError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_token_gate() {
        let tokens = Arc::new(SignedTokenService::new(JwtConfig::new("secret")));
        let issued = tokens.issue("bob").unwrap();
        let gate = AuthGate::SignedToken(tokens);

        let bearer = format!("Bearer {}", issued.token);
        let identity = gate
            .authorize(&headers(&[("authorization", bearer.as_str())]))
            .await
            .unwrap();
        assert_eq!(identity.subject, "bob");

        let bare = gate
            .authorize(&headers(&[("authorization", issued.token.as_str())]))
            .await
            .unwrap();
        assert_eq!(bare.subject, "bob");

        assert!(matches!(
            gate.authorize(&headers(&[("authorization", "Bearer garbage")])).await,
            Err(AuthError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_token_from_other_secret_rejected() {
        let other = SignedTokenService::new(JwtConfig::new("other"));
        let token = other.issue("mallory").unwrap().token;
        let gate = AuthGate::SignedToken(Arc::new(SignedTokenService::new(JwtConfig::new("secret"))));

        assert!(gate
            .authorize(&headers(&[("authorization", token.as_str())]))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_federated_gate_requires_header() {
        let verifier = FederatedVerifier::new(FederatedConfig::new("tenant.example.com", "api"))
            .unwrap();
        let gate = AuthGate::Federated(Arc::new(verifier));

        assert!(matches!(
            gate.authorize(&HeaderMap::new()).await,
            Err(AuthError::MissingCredential(_))
        ));
        assert!(matches!(
            gate.authorize(&headers(&[("authorization", "Bearer not-a-jwt")])).await,
            Err(AuthError::InvalidCredential(_))
        ));
    }
}
