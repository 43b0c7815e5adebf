//! Driving port for listing mutations.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::listing::{Listing, ListingDraft, ListingId, ListingUpdate};
use crate::domain::user::UserId;

/// Write-side listing operations. Every mutation runs the ownership guard
/// before touching storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Create a listing owned by `owner`, then append it to the owner's
    /// index. A failed index append is logged, not surfaced; the listing
    /// exists either way.
    async fn create(&self, owner: &UserId, draft: ListingDraft) -> Result<Listing, Error>;

    /// Update mutable fields of an owned listing. A replacement image is
    /// written in a second step after the field update.
    async fn update(
        &self,
        user_id: &UserId,
        id: &ListingId,
        update: ListingUpdate,
    ) -> Result<Listing, Error>;

    /// Delete an owned listing, then drop it from the owner's index. The
    /// delete is authoritative; a failed index removal is logged only.
    async fn delete(&self, user_id: &UserId, id: &ListingId) -> Result<(), Error>;

    /// Rebuild the owner's index from the listing store's owner column,
    /// returning the rebuilt sequence. Repairs drift left behind by
    /// tolerated index-write failures.
    async fn reconcile_owner_index(&self, user_id: &UserId) -> Result<Vec<ListingId>, Error>;
}
