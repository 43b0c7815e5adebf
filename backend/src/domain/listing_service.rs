//! Listing domain service: marketplace reads and owner-scoped writes.
//!
//! Implements the listing driving ports over the listing and user
//! repositories. Every mutation runs the ownership guard before touching
//! storage. The owner's listing index is derived data, so index writes
//! that fail after a successful row mutation are logged and tolerated
//! rather than failing the request; `reconcile_owner_index` repairs the
//! drift from the authoritative owner column.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::error;

use crate::domain::error::Error;
use crate::domain::listing::{
    Listing, ListingDraft, ListingId, ListingUpdate, ListingWithOwner,
};
use crate::domain::ports::{
    ListingCommand, ListingPersistenceError, ListingQuery, ListingRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::user::UserId;

/// Listing service implementing the query and command ports.
#[derive(Clone)]
pub struct ListingService<L, U> {
    listings: Arc<L>,
    users: Arc<U>,
}

impl<L, U> ListingService<L, U> {
    /// Create a new service over the given repositories.
    pub fn new(listings: Arc<L>, users: Arc<U>) -> Self {
        Self { listings, users }
    }
}

impl<L, U> ListingService<L, U>
where
    L: ListingRepository,
    U: UserRepository,
{
    fn map_listing_error(error: ListingPersistenceError) -> Error {
        match error {
            ListingPersistenceError::Connection { message } => {
                Error::persistence(format!("listing store unavailable: {message}"))
            }
            ListingPersistenceError::Query { message } => {
                Error::persistence(format!("listing store error: {message}"))
            }
            ListingPersistenceError::NotFound { .. } => Self::not_found(),
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::persistence(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::persistence(format!("user store error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { username } => {
                Error::internal(format!("unexpected duplicate username: {username}"))
            }
        }
    }

    fn not_found() -> Error {
        Error::not_found("Furniture not found")
    }

    fn forbidden() -> Error {
        Error::forbidden("You do not have permission to do that")
    }

    /// Ownership guard shared by every owner-scoped operation. Absence is
    /// checked before ownership so callers cannot probe which ids exist.
    async fn ensure_owned(
        &self,
        user_id: &UserId,
        id: &ListingId,
    ) -> Result<Listing, Error> {
        let listing = self
            .listings
            .find_by_id(id)
            .await
            .map_err(Self::map_listing_error)?
            .ok_or_else(Self::not_found)?;
        if listing.owner_id() != user_id {
            return Err(Self::forbidden());
        }
        Ok(listing)
    }
}

#[async_trait]
impl<L, U> ListingQuery for ListingService<L, U>
where
    L: ListingRepository,
    U: UserRepository,
{
    async fn list(&self) -> Result<Vec<ListingWithOwner>, Error> {
        self.listings
            .list_with_owners()
            .await
            .map_err(Self::map_listing_error)
    }

    async fn get(&self, id: &ListingId) -> Result<ListingWithOwner, Error> {
        self.listings
            .find_with_owner(id)
            .await
            .map_err(Self::map_listing_error)?
            .ok_or_else(Self::not_found)
    }

    async fn edit_view(&self, user_id: &UserId, id: &ListingId) -> Result<Listing, Error> {
        self.ensure_owned(user_id, id).await
    }
}

#[async_trait]
impl<L, U> ListingCommand for ListingService<L, U>
where
    L: ListingRepository,
    U: UserRepository,
{
    async fn create(&self, owner: &UserId, draft: ListingDraft) -> Result<Listing, Error> {
        let now = Utc::now();
        let listing = Listing::new(
            ListingId::random(),
            draft.name,
            draft.price,
            draft.image,
            owner.clone(),
            now,
            now,
        );

        self.listings
            .insert(&listing)
            .await
            .map_err(Self::map_listing_error)?;

        if let Err(index_error) = self.users.append_listing(owner, listing.id()).await {
            error!(
                listing_id = %listing.id(),
                owner_id = %owner,
                error = %index_error,
                "owner index append failed; listing row is persisted"
            );
        }
        Ok(listing)
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &ListingId,
        update: ListingUpdate,
    ) -> Result<Listing, Error> {
        self.ensure_owned(user_id, id).await?;

        let mut updated = self
            .listings
            .update_price(id, update.price)
            .await
            .map_err(Self::map_listing_error)?;
        if let Some(image) = update.image {
            updated = self
                .listings
                .set_image(id, &image)
                .await
                .map_err(Self::map_listing_error)?;
        }
        Ok(updated)
    }

    async fn delete(&self, user_id: &UserId, id: &ListingId) -> Result<(), Error> {
        self.ensure_owned(user_id, id).await?;

        self.listings
            .delete(id)
            .await
            .map_err(Self::map_listing_error)?;

        if let Err(index_error) = self.users.remove_listing(user_id, id).await {
            error!(
                listing_id = %id,
                owner_id = %user_id,
                error = %index_error,
                "owner index removal failed; listing row is deleted"
            );
        }
        Ok(())
    }

    async fn reconcile_owner_index(&self, user_id: &UserId) -> Result<Vec<ListingId>, Error> {
        let ids = self
            .listings
            .ids_owned_by(user_id)
            .await
            .map_err(Self::map_listing_error)?;
        self.users
            .replace_listing_index(user_id, &ids)
            .await
            .map_err(Self::map_user_error)?;
        Ok(ids)
    }
}
