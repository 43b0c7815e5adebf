//! User data model: account identity, profile attributes, and the
//! owned-listing index.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing::ListingId;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed length for a phone number.
pub const PHONE_MAX: usize = 32;
/// Inclusive age bounds.
pub const AGE_MIN: i32 = 1;
/// Upper inclusive age bound.
pub const AGE_MAX: i32 = 150;
/// Maximum allowed length for a location.
pub const LOCATION_MAX: usize = 128;

/// Validation errors for user identity and profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyPhoneNumber,
    PhoneNumberTooLong { max: usize },
    PhoneNumberInvalidCharacters,
    AgeNotANumber,
    AgeOutOfRange { min: i32, max: i32 },
    EmptyLocation,
    LocationTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username may only contain letters, numbers, or underscores")
            }
            Self::EmptyPhoneNumber => write!(f, "phone number must not be empty"),
            Self::PhoneNumberTooLong { max } => {
                write!(f, "phone number must be at most {max} characters")
            }
            Self::PhoneNumberInvalidCharacters => {
                write!(f, "phone number may only contain digits, spaces, or + - ( )")
            }
            Self::AgeNotANumber => write!(f, "age must be a whole number"),
            Self::AgeOutOfRange { min, max } => {
                write!(f, "age must be between {min} and {max}")
            }
            Self::EmptyLocation => write!(f, "location must not be empty"),
            Self::LocationTooLong { max } => {
                write!(f, "location must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// User identity, a UUID kept alongside its canonical text form.
///
/// The text form is what sessions and templates see; the UUID is what the
/// database stores. Holding both avoids re-rendering on every access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    uuid: Uuid,
    raw: String,
}

impl UserId {
    /// Parse and validate an identifier from untrusted input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Mint an identifier for a newly registered user.
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

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let uuid = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self { uuid, raw: id })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Character classes only; length checks happen before the match.
        Regex::new("^[A-Za-z0-9_]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Unique login name chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`]; leading and trailing
    /// whitespace is trimmed before validation.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = trimmed.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^[0-9+()\- ]+$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Contact phone number; loosely validated, stored as entered (trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(phone.into())
    }

    fn from_owned(phone: String) -> Result<Self, UserValidationError> {
        let trimmed = phone.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyPhoneNumber);
        }
        if trimmed.chars().count() > PHONE_MAX {
            return Err(UserValidationError::PhoneNumberTooLong { max: PHONE_MAX });
        }
        if !phone_regex().is_match(trimmed) {
            return Err(UserValidationError::PhoneNumberInvalidCharacters);
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Age in whole years, bounded to a plausible range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Age(i32);

impl Age {
    pub fn new(age: i32) -> Result<Self, UserValidationError> {
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(UserValidationError::AgeOutOfRange {
                min: AGE_MIN,
                max: AGE_MAX,
            });
        }
        Ok(Self(age))
    }

    /// Parse from form input; non-numeric input is its own error so the
    /// user sees "must be a whole number" rather than a range complaint.
    pub fn parse(input: &str) -> Result<Self, UserValidationError> {
        let age: i32 = input
            .trim()
            .parse()
            .map_err(|_| UserValidationError::AgeNotANumber)?;
        Self::new(age)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<Age> for i32 {
    fn from(value: Age) -> Self {
        value.0
    }
}

impl TryFrom<i32> for Age {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-text home location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    pub fn new(location: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(location.into())
    }

    fn from_owned(location: String) -> Result<Self, UserValidationError> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyLocation);
        }
        if trimmed.chars().count() > LOCATION_MAX {
            return Err(UserValidationError::LocationTooLong { max: LOCATION_MAX });
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl TryFrom<String> for Location {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Required profile attributes collected at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    phone_number: PhoneNumber,
    age: Age,
    location: Location,
}

impl Profile {
    pub fn new(phone_number: PhoneNumber, age: Age, location: Location) -> Self {
        Self {
            phone_number,
            age,
            location,
        }
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// A registered account together with its profile and owned listings.
///
/// ## Invariants
/// - `username` satisfies the [`Username`] rules and is unique store-wide.
/// - `password_hash` is a PHC-format hash; plaintext never reaches this type.
/// - `listing_ids` is the derived owned-listing index in creation order; the
///   listing store's owner column is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: String,
    profile: Profile,
    listing_ids: Vec<ListingId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble a [`User`] from validated components.
    pub fn new(
        id: UserId,
        username: Username,
        password_hash: String,
        profile: Profile,
        listing_ids: Vec<ListingId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            profile,
            listing_ids,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Stored credential hash; compared only through the hasher port.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Owned-listing references in creation order.
    pub fn listing_ids(&self) -> &[ListingId] {
        &self.listing_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
