//! Listing data model: furniture items offered on the marketplace.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{UserId, Username};

/// Maximum allowed length for a listing name.
pub const LISTING_NAME_MAX: usize = 64;

/// Validation errors for listing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    PriceNotANumber,
    PriceOutOfRange,
    EmptyImage,
}

impl fmt::Display for ListingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "listing id must not be empty"),
            Self::InvalidId => write!(f, "listing id must be a valid UUID"),
            Self::EmptyName => write!(f, "furniture name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "furniture name must be at most {max} characters")
            }
            Self::PriceNotANumber => write!(f, "price must be a number"),
            Self::PriceOutOfRange => write!(f, "price must be a non-negative number"),
            Self::EmptyImage => write!(f, "an image is required"),
        }
    }
}

impl std::error::Error for ListingValidationError {}

/// Listing identity, a UUID kept alongside its canonical text form.
///
/// Mirrors [`UserId`]: routes and templates consume the text form while the
/// database stores the UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingId {
    uuid: Uuid,
    raw: String,
}

impl ListingId {
    /// Parse and validate an identifier from untrusted input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ListingValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Mint an identifier for a newly created listing.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap a UUID that is already known to be valid.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            raw: uuid.to_string(),
            uuid,
        }
    }

    fn from_owned(id: String) -> Result<Self, ListingValidationError> {
        if id.is_empty() {
            return Err(ListingValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(ListingValidationError::InvalidId);
        }

        let uuid = Uuid::parse_str(&id).map_err(|_| ListingValidationError::InvalidId)?;
        Ok(Self { uuid, raw: id })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl AsRef<str> for ListingId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<ListingId> for String {
    fn from(value: ListingId) -> Self {
        value.raw
    }
}

impl TryFrom<String> for ListingId {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Display name of a furniture item. Immutable after creation by policy;
/// updates drop any incoming name before applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListingName(String);

impl ListingName {
    pub fn new(name: impl Into<String>) -> Result<Self, ListingValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, ListingValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ListingValidationError::EmptyName);
        }
        if trimmed.chars().count() > LISTING_NAME_MAX {
            return Err(ListingValidationError::NameTooLong {
                max: LISTING_NAME_MAX,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ListingName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ListingName> for String {
    fn from(value: ListingName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListingName {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Asking price. Finite and non-negative; no currency handling in scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(price: f64) -> Result<Self, ListingValidationError> {
        if !price.is_finite() || price < 0.0 {
            return Err(ListingValidationError::PriceOutOfRange);
        }
        Ok(Self(price))
    }

    /// Parse from form input; non-numeric input reports
    /// [`ListingValidationError::PriceNotANumber`].
    pub fn parse(input: &str) -> Result<Self, ListingValidationError> {
        let price: f64 = input
            .trim()
            .parse()
            .map_err(|_| ListingValidationError::PriceNotANumber)?;
        Self::new(price)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ListingValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reference to a stored listing image, e.g. `/uploads/1718900000000.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Result<Self, ListingValidationError> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(ListingValidationError::EmptyImage);
        }
        Ok(Self(reference))
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Furniture listing.
///
/// ## Invariants
/// - `owner_id` references the creating user and is never reassigned.
/// - `name` never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    id: ListingId,
    name: ListingName,
    price: Price,
    image: ImageRef,
    owner_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Listing {
    /// Assemble a [`Listing`] from validated components.
    pub fn new(
        id: ListingId,
        name: ListingName,
        price: Price,
        image: ImageRef,
        owner_id: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            price,
            image,
            owner_id,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ListingId {
        &self.id
    }

    pub fn name(&self) -> &ListingName {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Validated input for creating a listing. The owner comes from the
/// session, never from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub name: ListingName,
    pub price: Price,
    pub image: ImageRef,
}

/// Validated input for updating a listing. There is deliberately no name
/// field; the service additionally discards any name the transport layer
/// lets through.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingUpdate {
    pub price: Price,
    pub image: Option<ImageRef>,
}

/// Owner fields resolved alongside a listing for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub username: Username,
}

/// A listing joined with its owner's display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingWithOwner {
    pub listing: Listing,
    pub owner: OwnerSummary,
}
