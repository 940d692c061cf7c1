//! Recipes API
//!
//! A recipe-sharing REST service with:
//! - MongoDB or in-memory document storage
//! - A read-through Redis or in-memory cache of the recipe list
//! - User registration and sign-in
//! - One of four gates on the write routes: API key, session cookie,
//!   signed token or federated (JWKS) token

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use api::middleware::{AuthGate, GateStrategy};
use api::state::AppState;
use domain::{Cache, DomainError};
use infrastructure::auth::{
    FederatedConfig, FederatedVerifier, JwtConfig, SessionStore, SignedTokenService,
};
use infrastructure::cache::{CacheConfig, CacheFactory, CacheType};
use infrastructure::recipe::RecipeService;
use infrastructure::storage::{MongoConfig, StorageConfig, StorageFactory, StorageType};
use infrastructure::user::{PasswordScheme, UserService};

/// Connect to the configured backends and build the application state
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let strategy = GateStrategy::from_str(&config.auth.strategy)?;

    let storage_config = storage_config(config)?;
    info!(backend = %storage_config.storage_type(), "Connecting to store");
    let repositories = StorageFactory::create(&storage_config).await?;

    let cache_config = cache_config(config)?;
    info!(backend = %cache_config.cache_type, "Connecting to cache");
    let cache: Arc<dyn Cache> = CacheFactory::new().create(&cache_config).await?;

    let recipe_service = RecipeService::new(repositories.recipes, cache.clone())
        .with_cache_ttl(config.cache.ttl());

    let scheme = PasswordScheme::from_str(&config.auth.password_scheme)?;
    if scheme == PasswordScheme::LegacySha256 {
        warn!("legacy_sha256 password hashing is unsalted and must not be used in production");
    }
    let user_service = UserService::new(repositories.users, scheme.hasher(config.auth.bcrypt_cost));

    let sessions = Arc::new(SessionStore::new(cache.clone(), config.auth.session_ttl()));
    let tokens = Arc::new(SignedTokenService::new(JwtConfig::new(jwt_secret(
        config, strategy,
    )?)));
    let gate = build_gate(config, strategy, &sessions, &tokens)?;

    info!(strategy = %strategy, protect_list = config.auth.protect_list, "Auth gate configured");

    Ok(AppState {
        recipe_service: Arc::new(recipe_service),
        user_service: Arc::new(user_service),
        sessions,
        tokens,
        gate,
        cache,
        cookie_secure: config.auth.cookie_secure,
    })
}

fn storage_config(config: &AppConfig) -> Result<StorageConfig, DomainError> {
    Ok(match StorageType::from_str(&config.store.backend)? {
        StorageType::InMemory => StorageConfig::InMemory,
        StorageType::Mongo => StorageConfig::Mongo(
            MongoConfig::new(&config.store.uri, &config.store.database)
                .with_connect_timeout(config.store.connect_timeout()),
        ),
    })
}

fn cache_config(config: &AppConfig) -> Result<CacheConfig, DomainError> {
    let mut cache_config = match CacheType::from_str(&config.cache.backend)? {
        CacheType::InMemory => CacheConfig::in_memory(),
        CacheType::Redis => CacheConfig::redis(&config.cache.url),
    };
    cache_config.key_prefix = config.cache.key_prefix.clone();
    cache_config.max_capacity = config.cache.max_capacity;
    cache_config.connect_timeout = config.store.connect_timeout();
    Ok(cache_config)
}

/// Signing secret for issued tokens
///
/// Required when tokens guard the routes. Other strategies still issue
/// tokens at sign-in and fall back to a per-process random secret.
fn jwt_secret(config: &AppConfig, strategy: GateStrategy) -> Result<String, DomainError> {
    if !config.auth.jwt_secret.is_empty() {
        return Ok(config.auth.jwt_secret.clone());
    }

    if strategy == GateStrategy::SignedToken {
        return Err(DomainError::configuration(
            "auth.jwt_secret (or JWT_SECRET) is required for the jwt strategy",
        ));
    }

    warn!("No JWT secret configured, issued tokens will not survive a restart");
    Ok(format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    ))
}

fn build_gate(
    config: &AppConfig,
    strategy: GateStrategy,
    sessions: &Arc<SessionStore>,
    tokens: &Arc<SignedTokenService>,
) -> Result<AuthGate, DomainError> {
    Ok(match strategy {
        GateStrategy::ApiKey => {
            if config.auth.api_key.is_empty() {
                warn!("API key gate has no key configured and will reject every request");
            }
            AuthGate::api_key(&config.auth.api_key)
        }
        GateStrategy::Session => AuthGate::Session(sessions.clone()),
        GateStrategy::SignedToken => AuthGate::SignedToken(tokens.clone()),
        GateStrategy::Federated => {
            if config.auth0.domain.is_empty() || config.auth0.audience.is_empty() {
                return Err(DomainError::configuration(
                    "auth0.domain and auth0.audience are required for the auth0 strategy",
                ));
            }
            let mut federated = FederatedConfig::new(&config.auth0.domain, &config.auth0.audience);
            if let Some(url) = &config.auth0.jwks_url {
                federated = federated.with_jwks_url(url);
            }
            AuthGate::Federated(Arc::new(FederatedVerifier::new(federated)?))
        }
    })
}
