//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::auth::NewAccount;
use crate::domain::error::Error;
use crate::domain::user::User;

/// Registers new accounts.
///
/// Implementations hash the password, persist the account, and surface a
/// taken username as an invalid-request error with a
/// `{"field": "username", "code": "username_taken"}` detail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account from a validated registration payload.
    async fn register(&self, account: NewAccount) -> Result<User, Error>;
}
