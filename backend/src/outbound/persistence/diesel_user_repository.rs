//! PostgreSQL-backed [`UserRepository`] implementation using Diesel.
//!
//! Rows pass through the validating domain constructors on the way out, so
//! a corrupted row surfaces as a query error instead of an invalid entity.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Age, ListingId, Location, PhoneNumber, Profile, User, UserId, Username};

use super::diesel_error_mapping::{map_diesel_error_with, map_pool_error_with};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error_with(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error_with(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// A unique violation on insert can only be the username key.
fn map_insert_error(error: diesel::result::Error, username: &str) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if matches!(
        &error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ) {
        return UserPersistenceError::duplicate_username(username);
    }
    map_diesel_error(error)
}

/// Convert a database row into a validated domain account.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        username,
        password_hash,
        phone_number,
        age,
        location,
        listing_ids,
        created_at,
        updated_at,
    } = row;

    let username = Username::new(username).map_err(invalid_row)?;
    let phone_number = PhoneNumber::new(phone_number).map_err(invalid_row)?;
    let age = Age::new(age).map_err(invalid_row)?;
    let location = Location::new(location).map_err(invalid_row)?;
    let listing_ids = listing_ids.into_iter().map(ListingId::from_uuid).collect();

    Ok(User::new(
        UserId::from_uuid(id),
        username,
        password_hash,
        Profile::new(phone_number, age, location),
        listing_ids,
        created_at,
        updated_at,
    ))
}

fn invalid_row(error: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(error.to_string())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let listing_ids: Vec<Uuid> = user.listing_ids().iter().map(|id| *id.as_uuid()).collect();
        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            password_hash: user.password_hash(),
            phone_number: user.profile().phone_number().as_ref(),
            age: user.profile().age().value(),
            location: user.profile().location().as_ref(),
            listing_ids: &listing_ids,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, user.username().as_ref()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn append_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError> {
        let mut index = self.load_index(user_id).await?;
        if index.contains(listing_id.as_uuid()) {
            return Ok(());
        }
        index.push(*listing_id.as_uuid());
        self.store_index(user_id, &index).await
    }

    async fn remove_listing(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<(), UserPersistenceError> {
        let mut index = self.load_index(user_id).await?;
        let before = index.len();
        index.retain(|id| id != listing_id.as_uuid());
        if index.len() == before {
            return Ok(());
        }
        self.store_index(user_id, &index).await
    }

    async fn replace_listing_index(
        &self,
        user_id: &UserId,
        listing_ids: &[ListingId],
    ) -> Result<(), UserPersistenceError> {
        let index: Vec<Uuid> = listing_ids.iter().map(|id| *id.as_uuid()).collect();
        self.store_index(user_id, &index).await
    }
}

impl DieselUserRepository {
    async fn load_index(&self, user_id: &UserId) -> Result<Vec<Uuid>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        users::table
            .filter(users::id.eq(user_id.as_uuid()))
            .select(users::listing_ids)
            .first::<Vec<Uuid>>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| {
                UserPersistenceError::query(format!(
                    "owner {} missing for index update",
                    user_id.as_ref()
                ))
            })
    }

    async fn store_index(
        &self,
        user_id: &UserId,
        index: &[Uuid],
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set((
                users::listing_ids.eq(index),
                users::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
