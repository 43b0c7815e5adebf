//! Driving port for authentication and current-user resolution.

use async_trait::async_trait;

use crate::domain::auth::Credentials;
use crate::domain::error::Error;
use crate::domain::user::{User, UserId};

/// Verifies credentials and resolves session user ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate a username/password pair. Unknown usernames and wrong
    /// passwords fail identically so the response does not reveal which
    /// half was wrong.
    async fn authenticate(&self, credentials: Credentials) -> Result<User, Error>;

    /// Resolve a session's stored user id. `None` means the account no
    /// longer exists and the session should be treated as anonymous.
    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error>;
}
