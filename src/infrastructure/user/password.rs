//! Password hashing schemes

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::DomainError;

/// Lowest bcrypt cost accepted; smaller configured values are raised to it
pub const MIN_BCRYPT_COST: u32 = 10;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Selectable hashing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    Argon2,
    /// Unsalted hex SHA-256 digest. Equal passwords produce equal hashes;
    /// selectable only to reproduce that weakness, not to read older data.
    LegacySha256,
}

impl PasswordScheme {
    /// Build the hasher for this scheme
    pub fn hasher(self, bcrypt_cost: u32) -> Arc<dyn PasswordHasher> {
        match self {
            Self::Bcrypt => Arc::new(BcryptHasher::new(bcrypt_cost)),
            Self::Argon2 => Arc::new(Argon2Hasher::new()),
            Self::LegacySha256 => Arc::new(LegacySha256Hasher),
        }
    }
}

impl std::fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bcrypt => write!(f, "bcrypt"),
            Self::Argon2 => write!(f, "argon2"),
            Self::LegacySha256 => write!(f, "legacy_sha256"),
        }
    }
}

impl std::str::FromStr for PasswordScheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            "argon2" => Ok(Self::Argon2),
            "legacy_sha256" | "sha256" => Ok(Self::LegacySha256),
            _ => Err(DomainError::configuration(format!(
                "Unknown password scheme: {}. Valid schemes: bcrypt, argon2, legacy_sha256",
                s
            ))),
        }
    }
}

/// bcrypt password hasher
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(MIN_BCRYPT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hex SHA-256 digest of the password, compared directly
#[derive(Debug, Clone, Default)]
pub struct LegacySha256Hasher;

impl PasswordHasher for LegacySha256Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(hex::encode(Sha256::digest(password.as_bytes())))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hex::encode(Sha256::digest(password.as_bytes())) == hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = BcryptHasher::default();

        let hash = hasher.hash("my_secure_password").unwrap();

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("my_secure_password", &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_bcrypt_cost_floor() {
        assert_eq!(BcryptHasher::new(4).cost(), MIN_BCRYPT_COST);
        assert_eq!(BcryptHasher::new(12).cost(), 12);
    }

    #[test]
    fn test_bcrypt_verify_garbage_hash() {
        assert!(!BcryptHasher::default().verify("password", "not-a-hash"));
    }

    #[test]
    fn test_argon2_hash_is_salted() {
        let hasher = Argon2Hasher::new();

        let hash1 = hasher.hash("my_secure_password").unwrap();
        let hash2 = hasher.hash("my_secure_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("my_secure_password", &hash1));
        assert!(hasher.verify("my_secure_password", &hash2));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_legacy_sha256_collides_for_equal_passwords() {
        let hasher = LegacySha256Hasher;

        let hash1 = hasher.hash("hunter2").unwrap();
        let hash2 = hasher.hash("hunter2").unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hasher.verify("hunter2", &hash1));
        assert!(!hasher.verify("hunter3", &hash1));
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("bcrypt".parse::<PasswordScheme>().unwrap(), PasswordScheme::Bcrypt);
        assert_eq!("ARGON2".parse::<PasswordScheme>().unwrap(), PasswordScheme::Argon2);
        assert_eq!(
            "legacy_sha256".parse::<PasswordScheme>().unwrap(),
            PasswordScheme::LegacySha256
        );
        assert!("md5".parse::<PasswordScheme>().is_err());
        assert_eq!(PasswordScheme::LegacySha256.to_string(), "legacy_sha256");
    }
}
