//! Driving port for listing reads.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::listing::{Listing, ListingId, ListingWithOwner};
use crate::domain::user::UserId;

/// Read-side listing operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingQuery: Send + Sync {
    /// All listings with owners resolved, oldest first. An empty
    /// marketplace yields an empty vec, never an error.
    async fn list(&self) -> Result<Vec<ListingWithOwner>, Error>;

    /// One listing with its owner, or a not-found error.
    async fn get(&self, id: &ListingId) -> Result<ListingWithOwner, Error>;

    /// Current values for the edit form. Runs the ownership guard: absent
    /// listings are not-found, someone else's are forbidden.
    async fn edit_view(&self, user_id: &UserId, id: &ListingId) -> Result<Listing, Error>;
}
