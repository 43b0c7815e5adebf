//! In-memory store backing the repository ports.
//!
//! Serves two jobs: the development fallback when no database is
//! configured, and the backend for integration tests exercising the full
//! HTTP surface. Data lives in plain vecs guarded by mutexes; insertion
//! order doubles as creation order so listings never tie on timestamps.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::listing::{
    ImageRef, Listing, ListingId, ListingWithOwner, OwnerSummary, Price,
};
use crate::domain::ports::listing_repository::{ListingPersistenceError, ListingRepository};
use crate::domain::ports::user_repository::{UserPersistenceError, UserRepository};
use crate::domain::user::{User, UserId};

/// Shared in-memory user and listing store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    listings: Mutex<Vec<Listing>>,
}

fn tolerate_poison<'a, T>(result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>)
-> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> MutexGuard<'_, Vec<User>> {
        tolerate_poison(self.users.lock())
    }

    fn listings(&self) -> MutexGuard<'_, Vec<Listing>> {
        tolerate_poison(self.listings.lock())
    }

    fn owner_summary(users: &[User], owner_id: &UserId) -> Option<OwnerSummary> {
        users
            .iter()
            .find(|user| user.id() == owner_id)
            .map(|user| OwnerSummary {
                id: user.id().clone(),
                username: user.username().clone(),
            })
    }

    /// Snapshot of a user's owned-listing index; test support.
    pub fn user_listing_ids(&self, user_id: &UserId) -> Option<Vec<ListingId>> {
        self.users()
            .iter()
            .find(|user| user.id() == user_id)
            .map(|user| user.listing_ids().to_vec())
    }

    /// Number of stored listings; test support.
    pub fn listing_count(&self) -> usize {
        self.listings().len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users();
        if users
            .iter()
            .any(|existing| existing.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username().as_ref(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users().iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users()
            .iter()
            .find(|user| user.username().as_ref() == username)
            .cloned())
    }

    async fn append_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users();
        let user = users
            .iter_mut()
            .find(|user| user.id() == user_id)
            .ok_or_else(|| UserPersistenceError::query(format!("no such user: {user_id}")))?;
        let mut listing_ids = user.listing_ids().to_vec();
        listing_ids.push(listing_id.clone());
        *user = rebuilt_with_index(user, listing_ids);
        Ok(())
    }

    async fn remove_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users();
        let user = users
            .iter_mut()
            .find(|user| user.id() == user_id)
            .ok_or_else(|| UserPersistenceError::query(format!("no such user: {user_id}")))?;
        let listing_ids = user
            .listing_ids()
            .iter()
            .filter(|id| *id != listing_id)
            .cloned()
            .collect();
        *user = rebuilt_with_index(user, listing_ids);
        Ok(())
    }

    async fn replace_listing_index(
        &self,
        user_id: &UserId,
        listing_ids: &[ListingId],
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users();
        let user = users
            .iter_mut()
            .find(|user| user.id() == user_id)
            .ok_or_else(|| UserPersistenceError::query(format!("no such user: {user_id}")))?;
        *user = rebuilt_with_index(user, listing_ids.to_vec());
        Ok(())
    }
}

fn rebuilt_with_index(user: &User, listing_ids: Vec<ListingId>) -> User {
    User::new(
        user.id().clone(),
        user.username().clone(),
        user.password_hash().to_owned(),
        user.profile().clone(),
        listing_ids,
        user.created_at(),
        Utc::now(),
    )
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError> {
        self.listings().push(listing.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingPersistenceError> {
        Ok(self
            .listings()
            .iter()
            .find(|listing| listing.id() == id)
            .cloned())
    }

    async fn find_with_owner(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingWithOwner>, ListingPersistenceError> {
        let listing = match self
            .listings()
            .iter()
            .find(|listing| listing.id() == id)
            .cloned()
        {
            Some(listing) => listing,
            None => return Ok(None),
        };
        let users = self.users();
        Ok(
            Self::owner_summary(&users, listing.owner_id()).map(|owner| ListingWithOwner {
                listing,
                owner,
            }),
        )
    }

    async fn list_with_owners(&self) -> Result<Vec<ListingWithOwner>, ListingPersistenceError> {
        let listings = self.listings().clone();
        let users = self.users();
        Ok(listings
            .into_iter()
            .filter_map(|listing| {
                Self::owner_summary(&users, listing.owner_id())
                    .map(|owner| ListingWithOwner { listing, owner })
            })
            .collect())
    }

    async fn ids_owned_by(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<ListingId>, ListingPersistenceError> {
        Ok(self
            .listings()
            .iter()
            .filter(|listing| listing.owner_id() == owner_id)
            .map(|listing| listing.id().clone())
            .collect())
    }

    async fn update_price(
        &self,
        id: &ListingId,
        price: Price,
    ) -> Result<Listing, ListingPersistenceError> {
        let mut listings = self.listings();
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id() == id)
            .ok_or_else(|| ListingPersistenceError::not_found(id.as_ref()))?;
        *listing = Listing::new(
            listing.id().clone(),
            listing.name().clone(),
            price,
            listing.image().clone(),
            listing.owner_id().clone(),
            listing.created_at(),
            Utc::now(),
        );
        Ok(listing.clone())
    }

    async fn set_image(
        &self,
        id: &ListingId,
        image: &ImageRef,
    ) -> Result<Listing, ListingPersistenceError> {
        let mut listings = self.listings();
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id() == id)
            .ok_or_else(|| ListingPersistenceError::not_found(id.as_ref()))?;
        *listing = Listing::new(
            listing.id().clone(),
            listing.name().clone(),
            listing.price(),
            image.clone(),
            listing.owner_id().clone(),
            listing.created_at(),
            Utc::now(),
        );
        Ok(listing.clone())
    }

    async fn delete(&self, id: &ListingId) -> Result<(), ListingPersistenceError> {
        let mut listings = self.listings();
        let before = listings.len();
        listings.retain(|listing| listing.id() != id);
        if listings.len() == before {
            return Err(ListingPersistenceError::not_found(id.as_ref()));
        }
        Ok(())
    }
}
