//! Credential hashing
//!
//! Secrets are hashed with Argon2id into PHC strings. The clear secret is
//! never stored; verification re-derives the hash with the embedded salt and
//! parameters.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::CoreError;

/// One-way hash and verify for secrets
pub trait CredentialHasher: Send + Sync {
    /// Hash a secret into an opaque, self-describing string
    fn hash(&self, secret: &str) -> Result<String, CoreError>;

    /// Check a secret against a stored hash
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, CoreError>;
}

/// Argon2id hasher with tunable cost
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Hasher with the library's recommended parameters
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with explicit cost parameters.
    ///
    /// `memory_kib` is the memory cost in KiB, `iterations` the time cost and
    /// `parallelism` the number of lanes.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, CoreError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| CoreError::Configuration(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                CoreError::Internal("password hashing failed".to_string())
            })
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool, CoreError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {}", e);
            CoreError::Internal("invalid stored password hash".to_string())
        })?;

        match self.argon2().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Password verification failed: {}", e);
                Err(CoreError::Internal("password verification failed".to_string()))
            }
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}
