//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use async_trait::async_trait;

use crate::domain::ports::{
    ImageStore, ImageStoreError, ImageUpload, MemoryStore, PasswordHashError, PasswordHasher,
};
use crate::domain::{AccountService, ImageRef, ListingService};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible stand-in for the Argon2 adapter so handler tests stay fast.
pub struct MarkedHasher;

#[async_trait]
impl PasswordHasher for MarkedHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("hashed:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Image store double that fabricates references without touching disk.
pub struct StubImageStore;

#[async_trait]
impl ImageStore for StubImageStore {
    async fn save(&self, upload: ImageUpload) -> Result<ImageRef, ImageStoreError> {
        ImageRef::new(format!("/uploads/stub.{}", upload.extension))
            .map_err(|error| ImageStoreError::io(error.to_string()))
    }
}

/// Wire the real services over a shared in-memory store. The store handle
/// is returned so tests can inspect persisted rows directly.
pub fn test_state() -> (HttpState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let accounts = Arc::new(AccountService::new(store.clone(), Arc::new(MarkedHasher)));
    let listings = Arc::new(ListingService::new(store.clone(), store.clone()));
    let state = HttpState {
        registration: accounts.clone(),
        login: accounts,
        listing_query: listings.clone(),
        listing_command: listings,
        images: Arc::new(StubImageStore),
    };
    (state, store)
}
