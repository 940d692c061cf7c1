//! Federated (Auth0-style) bearer token verification against a JWKS endpoint

use std::collections::HashMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Settings for the federated identity provider
#[derive(Debug, Clone)]
pub struct FederatedConfig {
    /// Tenant domain, e.g. `tenant.auth0.com`
    pub domain: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Overrides the JWKS location derived from the domain
    pub jwks_url: Option<String>,
    pub fetch_timeout: Duration,
    /// Minimum gap between two fetches of the key set
    pub refetch_interval: Duration,
}

impl FederatedConfig {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            jwks_url: None,
            fetch_timeout: Duration::from_secs(5),
            refetch_interval: Duration::from_secs(30),
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = Some(url.into());
        self
    }

    pub fn with_refetch_interval(mut self, interval: Duration) -> Self {
        self.refetch_interval = interval;
        self
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", self.domain))
    }
}

/// Claims read from a verified federated token
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedClaims {
    pub sub: String,
    pub exp: i64,
}

/// Public key entry of a JWKS document
#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    /// Key type (RSA, EC, oct)
    kty: String,
    kid: Option<String>,
    /// RSA modulus (base64url)
    n: Option<String>,
    /// RSA public exponent (base64url)
    e: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<JwkKey>,
}

/// Verifies RS256 tokens issued by the configured tenant
///
/// Signing keys are cached by `kid`. An unknown `kid` triggers a refetch of
/// the key set, at most once per `refetch_interval`; concurrent misses wait
/// on the same fetch.
pub struct FederatedVerifier {
    config: FederatedConfig,
    client: reqwest::Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
    /// Time of the last fetch attempt, held while fetching
    last_fetch: Mutex<Option<Instant>>,
}

impl Debug for FederatedVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FederatedVerifier")
            .field("config", &self.config)
            .finish()
    }
}

impl FederatedVerifier {
    pub fn new(config: FederatedConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            keys: RwLock::new(HashMap::new()),
            last_fetch: Mutex::new(None),
        })
    }

    /// Verify signature, expiry, issuer and audience of a bearer token
    pub async fn verify(&self, token: &str) -> Result<FederatedClaims, DomainError> {
        let header = decode_header(token).map_err(|_| invalid_token())?;

        if header.alg != Algorithm::RS256 {
            return Err(invalid_token());
        }

        let kid = header.kid.ok_or_else(invalid_token)?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_issuer(&[self.config.issuer()]);

        decode::<FederatedClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Federated token rejected");
                invalid_token()
            })
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, DomainError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        let mut last_fetch = self.last_fetch.lock().await;

        // Another caller may have refreshed while this one waited
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        if last_fetch.is_some_and(|at| at.elapsed() < self.config.refetch_interval) {
            debug!(kid = %kid, "Unknown kid, key set fetched recently");
            return Err(invalid_token());
        }

        *last_fetch = Some(Instant::now());
        self.refresh_keys().await?;
        drop(last_fetch);

        self.keys
            .read()
            .await
            .get(kid)
            .cloned()
            .ok_or_else(invalid_token)
    }

    async fn refresh_keys(&self) -> Result<(), DomainError> {
        let url = self.config.jwks_url();
        debug!(url = %url, "Fetching JWKS");

        let jwks: Jwks = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "JWKS fetch failed");
                invalid_token()
            })?
            .json()
            .await
            .map_err(|e| {
                warn!(error = %e, "JWKS response is not a key set");
                invalid_token()
            })?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            let (Some(kid), Some(n), Some(e)) = (jwk.kid, jwk.n, jwk.e) else {
                continue;
            };
            match DecodingKey::from_rsa_components(&n, &e) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => warn!(kid = %kid, error = %err, "Skipping malformed JWK"),
            }
        }

        *self.keys.write().await = keys;
        Ok(())
    }
}

fn invalid_token() -> DomainError {
    DomainError::unauthorized("Invalid token")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use rand::rngs::OsRng;
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;
    use serde_json::json;
    use std::sync::OnceLock;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOMAIN: &str = "tenant.example.com";
    const AUDIENCE: &str = "https://recipes-api";

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap())
    }

    fn jwks_body(kid: &str) -> serde_json::Value {
        let key = test_key();
        json!({
            "keys": [{
                "kty": "RSA",
                "kid": kid,
                "alg": "RS256",
                "use": "sig",
                "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
            }]
        })
    }

    fn sign(kid: &str, claims: serde_json::Value) -> String {
        let pem = test_key()
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .unwrap();
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());

        encode(&header, &claims, &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap()).unwrap()
    }

    fn valid_claims() -> serde_json::Value {
        json!({
            "sub": "auth0|123",
            "aud": AUDIENCE,
            "iss": format!("https://{}/", DOMAIN),
            "exp": chrono::Utc::now().timestamp() + 600,
        })
    }

    fn config_for(server: &MockServer) -> FederatedConfig {
        FederatedConfig::new(DOMAIN, AUDIENCE)
            .with_jwks_url(format!("{}/.well-known/jwks.json", server.uri()))
    }

    async fn verifier_for(server: &MockServer) -> FederatedVerifier {
        FederatedVerifier::new(config_for(server)).unwrap()
    }

    async fn serve_jwks(server: &MockServer, kid: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body(kid)))
            .expect(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_config_derives_urls_from_domain() {
        let config = FederatedConfig::new(DOMAIN, AUDIENCE);
        assert_eq!(config.issuer(), "https://tenant.example.com/");
        assert_eq!(
            config.jwks_url(),
            "https://tenant.example.com/.well-known/jwks.json"
        );
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted_and_keys_are_cached() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 1).await;
        let verifier = verifier_for(&server).await;

        let token = sign("key-1", valid_claims());
        let claims = verifier.verify(&token).await.unwrap();
        assert_eq!(claims.sub, "auth0|123");

        verifier.verify(&token).await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_audience_is_rejected() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 1).await;
        let verifier = verifier_for(&server).await;

        let mut claims = valid_claims();
        claims["aud"] = json!("someone-else");

        let err = verifier.verify(&sign("key-1", claims)).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }

    #[tokio::test]
    async fn test_wrong_issuer_is_rejected() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 1).await;
        let verifier = verifier_for(&server).await;

        let mut claims = valid_claims();
        claims["iss"] = json!("https://evil.example.com/");

        assert!(verifier.verify(&sign("key-1", claims)).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_kid_within_interval_does_not_refetch() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 1).await;
        let verifier = verifier_for(&server).await;

        verifier.verify(&sign("key-1", valid_claims())).await.unwrap();
        assert!(verifier.verify(&sign("rotated", valid_claims())).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_after_interval() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 2).await;
        let verifier =
            FederatedVerifier::new(config_for(&server).with_refetch_interval(Duration::ZERO))
                .unwrap();

        verifier.verify(&sign("key-1", valid_claims())).await.unwrap();
        assert!(verifier.verify(&sign("rotated", valid_claims())).await.is_err());
    }

    #[tokio::test]
    async fn test_forged_kids_share_one_fetch() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 1).await;
        let verifier = verifier_for(&server).await;

        let tokens: Vec<String> = (0..25)
            .map(|i| sign(&format!("forged-{}", i), valid_claims()))
            .collect();
        let results =
            futures::future::join_all(tokens.iter().map(|t| verifier.verify(t))).await;

        assert!(results.iter().all(|r| r.is_err()));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);

        verifier.verify(&sign("key-1", valid_claims())).await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried_within_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let verifier = verifier_for(&server).await;

        for _ in 0..5 {
            assert!(verifier.verify(&sign("key-1", valid_claims())).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_unreachable_jwks_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let verifier = verifier_for(&server).await;

        assert!(verifier.verify(&sign("key-1", valid_claims())).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_without_fetch() {
        let server = MockServer::start().await;
        serve_jwks(&server, "key-1", 0).await;
        let verifier = verifier_for(&server).await;

        assert!(verifier.verify("not-a-jwt").await.is_err());
    }
}
