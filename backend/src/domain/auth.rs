//! Authentication inputs: login credentials and registration payloads.
//!
//! Passwords travel in [`Zeroizing`] buffers so plaintext is wiped when the
//! request finishes. Hashing and verification live behind
//! [`crate::domain::ports::PasswordHasher`].

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{Age, Location, PhoneNumber, Profile, UserValidationError, Username};

/// Minimum allowed password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum allowed password length, bounding hashing cost.
pub const PASSWORD_MAX: usize = 128;

/// Validation errors for login input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    EmptyUsername,
    EmptyPassword,
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username is required"),
            Self::EmptyPassword => write!(f, "password is required"),
        }
    }
}

impl std::error::Error for CredentialsError {}

/// Login input. The username is trimmed but otherwise unchecked here;
/// whether it exists is the service's concern.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    /// Build credentials from raw form input.
    pub fn try_from_parts(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let username = username.into().trim().to_owned();
        if username.is_empty() {
            return Err(CredentialsError::EmptyUsername);
        }
        let password = Zeroizing::new(password.into());
        if password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        Ok(Self { username, password })
    }
}

/// Validation errors for registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    User(UserValidationError),
    EmptyPassword,
    PasswordTooShort { min: usize },
    PasswordTooLong { max: usize },
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

impl From<UserValidationError> for RegistrationValidationError {
    fn from(err: UserValidationError) -> Self {
        Self::User(err)
    }
}

/// Validated registration payload.
#[derive(Debug)]
pub struct NewAccount {
    pub username: Username,
    pub password: Zeroizing<String>,
    pub profile: Profile,
}

impl NewAccount {
    /// Validate raw form input into a registration payload. Field checks
    /// run in display order so the first flash message matches the first
    /// offending form field.
    pub fn try_from_parts(
        username: impl Into<String>,
        password: impl Into<String>,
        phone_number: impl Into<String>,
        age: &str,
        location: impl Into<String>,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        let password = validate_password(password.into())?;
        let profile = Profile::new(
            PhoneNumber::new(phone_number)?,
            Age::parse(age)?,
            Location::new(location)?,
        );
        Ok(Self {
            username,
            password,
            profile,
        })
    }
}

fn validate_password(
    password: String,
) -> Result<Zeroizing<String>, RegistrationValidationError> {
    let password = Zeroizing::new(password);
    if password.is_empty() {
        return Err(RegistrationValidationError::EmptyPassword);
    }
    let length = password.chars().count();
    if length < PASSWORD_MIN {
        return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    if length > PASSWORD_MAX {
        return Err(RegistrationValidationError::PasswordTooLong { max: PASSWORD_MAX });
    }
    Ok(password)
}
