//! PostgreSQL-backed [`ListingRepository`] implementation using Diesel.
//!
//! Owner-joined reads resolve the owner's display fields in one query via
//! the `listings -> users` join; a listing whose owner row has vanished
//! simply drops out of the join.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ListingPersistenceError, ListingRepository};
use crate::domain::{
    ImageRef, Listing, ListingId, ListingName, ListingWithOwner, OwnerSummary, Price, UserId,
    Username,
};

use super::diesel_error_mapping::{map_diesel_error_with, map_pool_error_with};
use super::models::{ListingRow, NewListingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{listings, users};

/// Diesel-backed implementation of the listing repository port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListingPersistenceError {
    map_pool_error_with(error, ListingPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ListingPersistenceError {
    map_diesel_error_with(
        error,
        ListingPersistenceError::query,
        ListingPersistenceError::connection,
    )
}

/// Writes that target one row report a vanished row as `NotFound`.
fn map_write_error(error: diesel::result::Error, id: &ListingId) -> ListingPersistenceError {
    if matches!(error, diesel::result::Error::NotFound) {
        return ListingPersistenceError::not_found(id.as_ref());
    }
    map_diesel_error(error)
}

/// Convert a database row into a validated domain listing.
fn row_to_listing(row: ListingRow) -> Result<Listing, ListingPersistenceError> {
    let ListingRow {
        id,
        furniture_name,
        price,
        image,
        owner_id,
        created_at,
        updated_at,
    } = row;

    let name = ListingName::new(furniture_name).map_err(invalid_row)?;
    let price = Price::new(price).map_err(invalid_row)?;
    let image = ImageRef::new(image).map_err(invalid_row)?;

    Ok(Listing::new(
        ListingId::from_uuid(id),
        name,
        price,
        image,
        UserId::from_uuid(owner_id),
        created_at,
        updated_at,
    ))
}

/// Convert an owner-joined row pair into a listing with owner fields.
fn row_to_listing_with_owner(
    row: ListingRow,
    owner_id: Uuid,
    owner_username: String,
) -> Result<ListingWithOwner, ListingPersistenceError> {
    let listing = row_to_listing(row)?;
    let username = Username::new(owner_username).map_err(invalid_row)?;

    Ok(ListingWithOwner {
        listing,
        owner: OwnerSummary {
            id: UserId::from_uuid(owner_id),
            username,
        },
    })
}

fn invalid_row(error: impl std::fmt::Display) -> ListingPersistenceError {
    ListingPersistenceError::query(error.to_string())
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewListingRow {
            id: *listing.id().as_uuid(),
            furniture_name: listing.name().as_ref(),
            price: listing.price().value(),
            image: listing.image().as_ref(),
            owner_id: *listing.owner_id().as_uuid(),
            created_at: listing.created_at(),
            updated_at: listing.updated_at(),
        };

        diesel::insert_into(listings::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<Listing>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = listings::table
            .filter(listings::id.eq(id.as_uuid()))
            .select(ListingRow::as_select())
            .first::<ListingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_listing).transpose()
    }

    async fn find_with_owner(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingWithOwner>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = listings::table
            .inner_join(users::table)
            .filter(listings::id.eq(id.as_uuid()))
            .select((ListingRow::as_select(), users::id, users::username))
            .first::<(ListingRow, Uuid, String)>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|(listing, owner_id, owner_username)| {
            row_to_listing_with_owner(listing, owner_id, owner_username)
        })
        .transpose()
    }

    async fn list_with_owners(&self) -> Result<Vec<ListingWithOwner>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ListingRow, Uuid, String)> = listings::table
            .inner_join(users::table)
            .order(listings::created_at.asc())
            .select((ListingRow::as_select(), users::id, users::username))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(listing, owner_id, owner_username)| {
                row_to_listing_with_owner(listing, owner_id, owner_username)
            })
            .collect()
    }

    async fn ids_owned_by(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<ListingId>, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<Uuid> = listings::table
            .filter(listings::owner_id.eq(owner_id.as_uuid()))
            .order(listings::created_at.asc())
            .select(listings::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ids.into_iter().map(ListingId::from_uuid).collect())
    }

    async fn update_price(
        &self,
        id: &ListingId,
        price: Price,
    ) -> Result<Listing, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(listings::table.filter(listings::id.eq(id.as_uuid())))
            .set((
                listings::price.eq(price.value()),
                listings::updated_at.eq(chrono::Utc::now()),
            ))
            .returning(ListingRow::as_returning())
            .get_result::<ListingRow>(&mut conn)
            .await
            .map_err(|error| map_write_error(error, id))?;

        row_to_listing(row)
    }

    async fn set_image(
        &self,
        id: &ListingId,
        image: &ImageRef,
    ) -> Result<Listing, ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(listings::table.filter(listings::id.eq(id.as_uuid())))
            .set((
                listings::image.eq(image.as_ref()),
                listings::updated_at.eq(chrono::Utc::now()),
            ))
            .returning(ListingRow::as_returning())
            .get_result::<ListingRow>(&mut conn)
            .await
            .map_err(|error| map_write_error(error, id))?;

        row_to_listing(row)
    }

    async fn delete(&self, id: &ListingId) -> Result<(), ListingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(listings::table.filter(listings::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(ListingPersistenceError::not_found(id.as_ref()));
        }
        Ok(())
    }
}
