//! Argon2id password hashing behind the domain hasher port.
//!
//! Hashes are PHC strings, so parameters and salts travel with the hash
//! and older records keep verifying after a parameter bump.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Hasher using Argon2id with the `argon2` crate's default parameters.
///
/// Hashing is deliberately memory-hard, so both operations run on the
/// blocking pool rather than the async executor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|error| PasswordHashError::hash(error.to_string()))
        })
        .await
        .map_err(|error| PasswordHashError::hash(error.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|error| PasswordHashError::verify(error.to_string()))?;
            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(error) => Err(PasswordHashError::verify(error.to_string())),
            }
        })
        .await
        .map_err(|error| PasswordHashError::verify(error.to_string()))?
    }
}
