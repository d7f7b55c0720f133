//! Password hashing.
//!
//! Argon2id with work factors taken from configuration, so deployments can
//! raise the cost without touching code. Verification reads the parameters
//! embedded in each stored hash, which keeps hashes minted under older
//! settings verifiable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;
use crate::config::HashingConfig;

/// Password hashing service.
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Create a hashing service with the configured work factors.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the work factors are outside the
    /// ranges Argon2 accepts.
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|_| AuthError::PasswordHash)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Never errors: a malformed or truncated stored hash verifies as
    /// `false`, the same as a wrong password.
    #[must_use]
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

// ===== Tests =====
