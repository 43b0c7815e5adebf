//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories here only translate between Diesel rows and domain types;
//! business rules stay in the domain services. Row structs and the schema
//! are internal to this module, and connections come from a `bb8` pool via
//! `diesel-async`.

mod diesel_error_mapping;
mod diesel_listing_repository;
mod diesel_user_repository;
mod migrate;
mod models;
mod pool;
mod schema;

pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrate::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolError, PoolOptions};
