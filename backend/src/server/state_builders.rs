//! Builders wiring domain services to their persistence adapters.

use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use backend::domain::ports::{ImageStore, ListingRepository, MemoryStore, UserRepository};
use backend::domain::{AccountService, ListingService};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{DbPool, DieselListingRepository, DieselUserRepository};
use backend::outbound::security::Argon2PasswordHasher;
use backend::outbound::storage::DiskImageStore;

/// Build the shared HTTP state from the configured adapters.
///
/// A database pool selects the Diesel repositories; without one the whole
/// store lives in process memory and evaporates on restart, which only
/// suits development.
pub(super) fn build_http_state(pool: Option<&DbPool>, upload_dir: &Path) -> web::Data<HttpState> {
    let images: Arc<dyn ImageStore> = Arc::new(DiskImageStore::new(upload_dir));
    match pool {
        Some(pool) => wire_state(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselListingRepository::new(pool.clone())),
            images,
        ),
        None => {
            warn!("no database pool configured; accounts and listings are held in memory");
            let store = Arc::new(MemoryStore::new());
            wire_state(store.clone(), store, images)
        }
    }
}

fn wire_state<U, L>(
    users: Arc<U>,
    listings: Arc<L>,
    images: Arc<dyn ImageStore>,
) -> web::Data<HttpState>
where
    U: UserRepository + 'static,
    L: ListingRepository + 'static,
{
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let listings = Arc::new(ListingService::new(listings, users));
    web::Data::new(HttpState {
        registration: accounts.clone(),
        login: accounts,
        listing_query: listings.clone(),
        listing_command: listings,
        images,
    })
}
