//! View payloads for the JSON-rendered pages.
//!
//! Every `GET` view answers with one of these shapes: the drained flash
//! queue, the signed-in viewer (if any), and the page body. Timestamps are
//! RFC 3339 strings.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, FieldSpec, Listing, ListingWithOwner, OwnerSummary, User};
use crate::inbound::http::session::{Flash, SessionContext};
use crate::inbound::http::state::HttpState;

/// The signed-in user as rendered in page chrome.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewerResponse {
    pub id: String,
    pub username: String,
}

impl From<&User> for ViewerResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
        }
    }
}

/// Owner fields rendered beside a listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: String,
    pub username: String,
}

impl From<OwnerSummary> for OwnerResponse {
    fn from(owner: OwnerSummary) -> Self {
        Self {
            id: owner.id.to_string(),
            username: owner.username.to_string(),
        }
    }
}

/// A listing with its owner, as rendered on the index and show pages.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub furniture_name: String,
    pub price: f64,
    pub image: String,
    pub owner: OwnerResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ListingWithOwner> for ListingResponse {
    fn from(row: ListingWithOwner) -> Self {
        Self {
            id: row.listing.id().to_string(),
            furniture_name: row.listing.name().to_string(),
            price: row.listing.price().value(),
            image: row.listing.image().to_string(),
            owner: row.owner.into(),
            created_at: row.listing.created_at().to_rfc3339(),
            updated_at: row.listing.updated_at().to_rfc3339(),
        }
    }
}

/// Current values backing the edit form.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingValuesResponse {
    pub id: String,
    pub furniture_name: String,
    pub price: f64,
    pub image: String,
}

impl From<&Listing> for ListingValuesResponse {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id().to_string(),
            furniture_name: listing.name().to_string(),
            price: listing.price().value(),
            image: listing.image().to_string(),
        }
    }
}

/// Drained flash queue plus viewer chrome, shared by every page payload.
pub(crate) struct PageChrome {
    pub flash: Vec<Flash>,
    pub viewer: Option<ViewerResponse>,
}

/// Drain the flash queue and resolve the viewer for a page render.
pub(crate) async fn page_chrome(
    state: &HttpState,
    session: &SessionContext,
) -> Result<PageChrome, Error> {
    let flash = session.take_flashes()?;
    let viewer = state.resolve_viewer(session).await?;
    Ok(PageChrome {
        flash,
        viewer: viewer.as_ref().map(ViewerResponse::from),
    })
}

/// Payload for `GET /furniture`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub flash: Vec<Flash>,
    pub viewer: Option<ViewerResponse>,
    pub listings: Vec<ListingResponse>,
}

/// Payload for `GET /furniture/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowPage {
    pub flash: Vec<Flash>,
    pub viewer: Option<ViewerResponse>,
    pub listing: ListingResponse,
}

/// Payload for the form-descriptor pages (register, login, create).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormPage {
    pub flash: Vec<Flash>,
    pub viewer: Option<ViewerResponse>,
    pub fields: Vec<FieldSpec>,
}

/// Payload for `GET /furniture/{id}/edit`: the edit form descriptor plus
/// the listing's current values.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPage {
    pub flash: Vec<Flash>,
    pub viewer: Option<ViewerResponse>,
    pub fields: Vec<FieldSpec>,
    pub listing: ListingValuesResponse,
}
