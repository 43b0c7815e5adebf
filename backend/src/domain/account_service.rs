//! Account domain service: registration, login, and session lookups.
//!
//! Implements the driving ports over a user repository and a password
//! hasher. Login failures for unknown usernames and wrong passwords carry
//! the same message so the response never reveals which half was wrong.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::domain::auth::{Credentials, NewAccount};
use crate::domain::error::Error;
use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, UserPersistenceError,
    UserRepository,
};
use crate::domain::user::{User, UserId};

const INVALID_CREDENTIALS: &str = "Password or username is incorrect";

/// Account service implementing the registration and login ports.
#[derive(Clone)]
pub struct AccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> AccountService<R, H> {
    /// Create a new service over the given repository and hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<R, H> AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::persistence(format!("user store unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::persistence(format!("user store error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { .. } => Self::username_taken(),
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        match error {
            PasswordHashError::Hash { message } => {
                Error::internal(format!("password hashing failed: {message}"))
            }
            PasswordHashError::Verify { message } => {
                Error::internal(format!("password verification failed: {message}"))
            }
        }
    }

    fn username_taken() -> Error {
        Error::invalid_request("Username is already taken").with_details(json!({
            "field": "username",
            "code": "username_taken",
        }))
    }

    fn invalid_credentials() -> Error {
        Error::unauthorized(INVALID_CREDENTIALS)
    }
}

#[async_trait]
impl<R, H> RegistrationService for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, account: NewAccount) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(&account.password)
            .await
            .map_err(Self::map_hash_error)?;

        let now = Utc::now();
        let user = User::new(
            UserId::random(),
            account.username,
            password_hash,
            account.profile,
            Vec::new(),
            now,
            now,
        );

        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;
        Ok(user)
    }
}

#[async_trait]
impl<R, H> LoginService for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: Credentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_username(&credentials.username)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(Self::invalid_credentials)?;

        let verified = self
            .hasher
            .verify(&credentials.password, user.password_hash())
            .await
            .map_err(Self::map_hash_error)?;
        if !verified {
            return Err(Self::invalid_credentials());
        }
        Ok(user)
    }

    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_user_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository};
    use crate::domain::user::{Age, Location, PhoneNumber, Profile, Username};
    use rstest::rstest;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

    fn make_service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AccountService<MockUserRepository, MockPasswordHasher> {
        AccountService::new(Arc::new(users), Arc::new(hasher))
    }

    fn new_account(username: &str) -> NewAccount {
        NewAccount::try_from_parts(username, "correct horse", "07700900123", "37", "Bristol")
            .expect("valid registration")
    }

    fn stored_user(username: &str) -> User {
        let now = Utc::now();
        User::new(
            UserId::random(),
            Username::new(username).expect("valid username"),
            HASH.to_owned(),
            Profile::new(
                PhoneNumber::new("07700900123").expect("valid phone"),
                Age::new(37).expect("valid age"),
                Location::new("Bristol").expect("valid location"),
            ),
            Vec::new(),
            now,
            now,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_then_persists() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|user: &User| {
                user.username().as_ref() == "walnut"
                    && user.password_hash() == HASH
                    && user.listing_ids().is_empty()
            })
            .times(1)
            .return_once(|_| Ok(()));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password: &str| password == "correct horse")
            .times(1)
            .return_once(|_| Ok(HASH.to_owned()));

        let service = make_service(users, hasher);
        let user = service
            .register(new_account("walnut"))
            .await
            .expect("registration succeeds");
        assert_eq!(user.username().as_ref(), "walnut");
        assert_eq!(user.password_hash(), HASH);
    }

    #[rstest]
    #[tokio::test]
    async fn register_surfaces_duplicate_username_as_field_error() {
        let mut users = MockUserRepository::new();
        users.expect_insert().times(1).return_once(|_| {
            Err(UserPersistenceError::duplicate_username("walnut"))
        });
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .return_once(|_| Ok(HASH.to_owned()));

        let service = make_service(users, hasher);
        let error = service
            .register(new_account("walnut"))
            .await
            .expect_err("duplicate username");
        assert_eq!(error.code, ErrorCode::InvalidRequest);
        let details = error.details.expect("field details");
        assert_eq!(details["field"], "username");
        assert_eq!(details["code"], "username_taken");
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_unknown_username_without_verifying() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .return_once(|_| Ok(None));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().times(0);

        let service = make_service(users, hasher);
        let error = service
            .authenticate(Credentials::try_from_parts("ghost", "whatever!").expect("credentials"))
            .await
            .expect_err("unknown username");
        assert_eq!(error.code, ErrorCode::Unauthorized);
        assert_eq!(error.message, INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_wrong_password_with_the_same_message() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .return_once(|_| Ok(Some(stored_user("walnut"))));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().times(1).return_once(|_, _| Ok(false));

        let service = make_service(users, hasher);
        let error = service
            .authenticate(Credentials::try_from_parts("walnut", "wrong password").expect(
                "credentials",
            ))
            .await
            .expect_err("wrong password");
        assert_eq!(error.code, ErrorCode::Unauthorized);
        assert_eq!(error.message, INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_returns_the_account_on_success() {
        let stored = stored_user("walnut");
        let expected_id = stored.id().clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|username: &str| username == "walnut")
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|password: &str, hash: &str| password == "correct horse" && hash == HASH)
            .times(1)
            .return_once(|_, _| Ok(true));

        let service = make_service(users, hasher);
        let user = service
            .authenticate(Credentials::try_from_parts("walnut", "correct horse").expect(
                "credentials",
            ))
            .await
            .expect("login succeeds");
        assert_eq!(user.id(), &expected_id);
    }

    #[rstest]
    #[tokio::test]
    async fn current_user_passes_through_missing_accounts() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(1).return_once(|_| Ok(None));
        let hasher = MockPasswordHasher::new();

        let service = make_service(users, hasher);
        let found = service
            .current_user(&UserId::random())
            .await
            .expect("lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn persistence_failures_map_to_persistence_errors() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(1).return_once(|_| {
            Err(UserPersistenceError::connection("refused"))
        });
        let hasher = MockPasswordHasher::new();

        let service = make_service(users, hasher);
        let error = service
            .current_user(&UserId::random())
            .await
            .expect_err("store down");
        assert_eq!(error.code, ErrorCode::PersistenceError);
    }
}
