//! Domain types, services, and ports.
//!
//! Purpose: define the strongly typed model for accounts and furniture
//! listings plus the services that drive them, independent of HTTP and
//! storage. Types are immutable after validation; each type's Rustdoc
//! documents its invariants and serialisation contract.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: the error payload shared across layers.
//! - [`User`], [`Profile`], and the account value types.
//! - [`Listing`] and the listing value types.
//! - [`AccountService`] / [`ListingService`]: port implementations.
//! - [`ports`]: the hexagonal boundary traits.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod fields;
pub mod listing;
pub mod listing_service;
pub mod ports;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    Credentials, CredentialsError, NewAccount, PASSWORD_MAX, PASSWORD_MIN,
    RegistrationValidationError,
};
pub use self::error::{ApiResult, Error, ErrorCode};
pub use self::fields::{
    ALLOWED_IMAGE_TYPES, FieldKind, FieldSpec, LISTING_CREATE_FIELDS, LISTING_EDIT_FIELDS,
    LOGIN_FIELDS, REGISTRATION_FIELDS,
};
pub use self::listing::{
    ImageRef, LISTING_NAME_MAX, Listing, ListingDraft, ListingId, ListingName, ListingUpdate,
    ListingValidationError, ListingWithOwner, OwnerSummary, Price,
};
pub use self::listing_service::ListingService;
pub use self::user::{
    Age, Location, PhoneNumber, Profile, User, UserId, UserValidationError, Username,
};
