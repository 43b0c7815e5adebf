//! Port for listing persistence.

use async_trait::async_trait;

use crate::domain::listing::{ImageRef, Listing, ListingId, ListingWithOwner, Price};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing repository adapters.
    pub enum ListingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "listing store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing store query failed: {message}",
        /// The targeted listing does not exist.
        NotFound { id: String } =>
            "listing not found: {id}",
    }
}

/// Port for listing storage and retrieval.
///
/// Reads that join the owner resolve the owner's display fields from the
/// user store; a listing whose owner row has vanished is treated as absent
/// by those reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Persist a new listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError>;

    /// Fetch a listing by id.
    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingPersistenceError>;

    /// Fetch a listing with its owner's display fields.
    async fn find_with_owner(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingWithOwner>, ListingPersistenceError>;

    /// All listings with owners, oldest first.
    async fn list_with_owners(&self) -> Result<Vec<ListingWithOwner>, ListingPersistenceError>;

    /// Ids of listings owned by the user, oldest first. Source data for
    /// rebuilding the owner index.
    async fn ids_owned_by(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<ListingId>, ListingPersistenceError>;

    /// Apply the mutable fields, returning the updated listing. Fails with
    /// [`ListingPersistenceError::NotFound`] when the row is gone.
    async fn update_price(
        &self,
        id: &ListingId,
        price: Price,
    ) -> Result<Listing, ListingPersistenceError>;

    /// Replace the stored image reference, returning the updated listing.
    async fn set_image(
        &self,
        id: &ListingId,
        image: &ImageRef,
    ) -> Result<Listing, ListingPersistenceError>;

    /// Delete the listing row. Fails with
    /// [`ListingPersistenceError::NotFound`] when the row is gone.
    async fn delete(&self, id: &ListingId) -> Result<(), ListingPersistenceError>;
}
