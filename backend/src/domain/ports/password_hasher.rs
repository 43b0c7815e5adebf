//! Port for credential hashing.
//!
//! The domain never sees hashing internals; it hands plaintext to this
//! port and stores the opaque PHC string it gets back. Verification is a
//! yes/no answer, so timing and format details stay inside the adapter.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHashError {
        /// Hashing the plaintext failed.
        Hash { message: String } =>
            "password hashing failed: {message}",
        /// The stored hash could not be parsed or compared.
        Verify { message: String } =>
            "password verification failed: {message}",
    }
}

/// Port for hashing and verifying passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a PHC-format string.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check a plaintext password against a stored PHC string. A mismatch
    /// is `Ok(false)`; `Err` means the comparison itself failed.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
