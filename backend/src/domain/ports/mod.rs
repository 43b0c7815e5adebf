//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod image_store;
mod listing_command;
mod listing_query;
mod listing_repository;
mod login;
mod memory;
mod password_hasher;
mod registration;
mod user_repository;

#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError, ImageUpload};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::ListingCommand;
#[cfg(test)]
pub use listing_query::MockListingQuery;
pub use listing_query::ListingQuery;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingPersistenceError, ListingRepository};
#[cfg(test)]
pub use login::MockLoginService;
pub use login::LoginService;
pub use memory::MemoryStore;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use registration::MockRegistrationService;
pub use registration::RegistrationService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
