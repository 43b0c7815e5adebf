//! Port for user account persistence.
//!
//! Besides account records, implementations maintain the owned-listing
//! index (`listing_ids`). The index is derived data; the listing store's
//! owner column stays authoritative, so index writes may fail without
//! invalidating the operation that triggered them (the caller decides).

use async_trait::async_trait;

use crate::domain::listing::ListingId;
use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user store query failed: {message}",
        /// The username is already registered.
        DuplicateUsername { username: String } =>
            "username already taken: {username}",
    }
}

/// Port for user account storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account. Fails with
    /// [`UserPersistenceError::DuplicateUsername`] when the username is in
    /// use.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch an account by id. `None` means the account does not exist.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Append a listing reference to the owner's index.
    async fn append_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError>;

    /// Remove a listing reference from the owner's index. Removing an id
    /// that is not present is not an error.
    async fn remove_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError>;

    /// Overwrite the owner's index wholesale, used by reconciliation.
    async fn replace_listing_index(
        &self,
        user_id: &UserId,
        listing_ids: &[ListingId],
    ) -> Result<(), UserPersistenceError>;
}
