//! Furniture listing handlers: browse, create, edit, delete.
//!
//! ```text
//! GET    /                    -> redirect to /furniture
//! GET    /furniture           -> all listings with owners
//! GET    /furniture/new       -> creation form descriptor (login required)
//! POST   /furniture           -> multipart create (login required)
//! GET    /furniture/{id}      -> one listing with its owner
//! GET    /furniture/{id}/edit -> edit form descriptor (owner only)
//! PUT    /furniture/{id}      -> multipart update (owner only)
//! DELETE /furniture/{id}      -> delete (owner only)
//! ```
//!
//! A malformed `{id}` behaves exactly like a missing listing, so the URL
//! space never reveals which ids parse. Browse pages answer JSON; the
//! guarded and mutating routes answer `303 See Other` on failure, with the
//! flash text and target chosen by the route's [`ErrorRouting`].

use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::ports::ImageStoreError;
use crate::domain::{
    Error, LISTING_CREATE_FIELDS, LISTING_EDIT_FIELDS, Listing, ListingDraft, ListingId,
    ListingName, ListingUpdate, ListingValidationError, Price,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redirects::{
    ErrorRouting, INDEX_PATH, WENT_WRONG, flash_or_log, redirect_for_error, see_other,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{Flash, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::uploads::{
    CreateListingForm, UpdateListingForm, submitted_image, validate_image,
};
use crate::inbound::http::views::{
    EditPage, FormPage, IndexPage, ListingResponse, ListingValuesResponse, ShowPage,
    ViewerResponse, page_chrome,
};

pub(crate) const NEW_FORM_PATH: &str = "/furniture/new";

const CREATED: &str = "Successfully created new furniture!";
const UPDATED: &str = "Successfully updated furniture!";
const DELETED: &str = "Successfully deleted furniture!";
const CREATE_FAILED: &str = "Failed to create furniture";
const UPDATE_FAILED: &str = "Failed to update furniture";
const DELETE_FAILED: &str = "Failed to delete furniture";

/// Path segment carrying a listing id.
#[derive(Debug, Deserialize)]
pub struct ListingPath {
    id: String,
}

fn show_path(id: &str) -> String {
    format!("/furniture/{id}")
}

fn edit_path(id: &str) -> String {
    format!("/furniture/{id}/edit")
}

/// A malformed id is indistinguishable from a missing listing.
fn parse_listing_id(path: &ListingPath) -> Result<ListingId, Error> {
    ListingId::new(&path.id).map_err(|_| Error::not_found("Furniture not found"))
}

/// Redirect the bare root to the marketplace index.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 303, description = "Redirect to /furniture", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "root",
    security([])
)]
#[get("/")]
pub async fn root() -> HttpResponse {
    see_other(INDEX_PATH)
}

/// List every listing with its owner, oldest first.
#[utoipa::path(
    get,
    path = "/furniture",
    responses(
        (status = 200, description = "All listings, oldest first", body = IndexPage),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["furniture"],
    operation_id = "listFurniture",
    security([])
)]
#[get("/furniture")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<IndexPage>> {
    let listings = state.listing_query.list().await?;
    let chrome = page_chrome(&state, &session).await?;
    Ok(web::Json(IndexPage {
        flash: chrome.flash,
        viewer: chrome.viewer,
        listings: listings.into_iter().map(ListingResponse::from).collect(),
    }))
}

/// Serve the creation form descriptor to a signed-in user.
#[utoipa::path(
    get,
    path = "/furniture/new",
    responses(
        (status = 200, description = "Creation form descriptor", body = FormPage),
        (status = 303, description = "Redirect to /login when signed out", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "newFurnitureForm"
)]
#[get("/furniture/new")]
pub async fn new_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
) -> HttpResponse {
    match try_new_form(&state, &session).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::uniform(INDEX_PATH, WENT_WRONG),
        ),
    }
}

async fn try_new_form(state: &HttpState, session: &SessionContext) -> Result<FormPage, Error> {
    let account = state.require_account(session).await?;
    let flash = session.take_flashes()?;
    Ok(FormPage {
        flash,
        viewer: Some(ViewerResponse::from(&account)),
        fields: LISTING_CREATE_FIELDS.to_vec(),
    })
}

/// Create a listing from the multipart form: `furnitureName`, `price`,
/// and a required `image` file.
#[utoipa::path(
    post,
    path = "/furniture",
    responses(
        (status = 303, description = "Redirect: the new listing on success, /furniture/new on failure", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "createFurniture"
)]
#[post("/furniture")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    form: MultipartForm<CreateListingForm>,
) -> HttpResponse {
    match try_create(&state, &session, form.into_inner()).await {
        Ok(listing) => {
            flash_or_log(&session, Flash::success(CREATED));
            see_other(&show_path(listing.id().as_ref()))
        }
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::new(NEW_FORM_PATH, INDEX_PATH, NEW_FORM_PATH, CREATE_FAILED),
        ),
    }
}

async fn try_create(
    state: &HttpState,
    session: &SessionContext,
    form: CreateListingForm,
) -> Result<Listing, Error> {
    let account = state.require_account(session).await?;
    let name =
        ListingName::new(form.furniture_name.into_inner()).map_err(map_listing_validation_error)?;
    let price = Price::parse(&form.price).map_err(map_listing_validation_error)?;
    let upload = validate_image(&form.image)?;
    let image = state
        .images
        .save(upload)
        .await
        .map_err(map_image_store_error)?;
    state
        .listing_command
        .create(account.id(), ListingDraft { name, price, image })
        .await
}

/// Show one listing with its owner.
#[utoipa::path(
    get,
    path = "/furniture/{id}",
    params(
        ("id" = String, Path, description = "Listing identifier")
    ),
    responses(
        (status = 200, description = "The listing with its owner", body = ShowPage),
        (status = 303, description = "Redirect to /furniture when the listing is missing", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "showFurniture",
    security([])
)]
#[get("/furniture/{id}")]
pub async fn show(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<ListingPath>,
) -> HttpResponse {
    match try_show(&state, &session, &path).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::uniform(INDEX_PATH, WENT_WRONG),
        ),
    }
}

async fn try_show(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
) -> Result<ShowPage, Error> {
    let id = parse_listing_id(path)?;
    let listing = state.listing_query.get(&id).await?;
    let chrome = page_chrome(state, session).await?;
    Ok(ShowPage {
        flash: chrome.flash,
        viewer: chrome.viewer,
        listing: listing.into(),
    })
}

/// Serve the edit form descriptor with current values to the owner.
#[utoipa::path(
    get,
    path = "/furniture/{id}/edit",
    params(
        ("id" = String, Path, description = "Listing identifier")
    ),
    responses(
        (status = 200, description = "Edit form descriptor with current values", body = EditPage),
        (status = 303, description = "Redirect on guard failure", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "editFurnitureForm"
)]
#[get("/furniture/{id}/edit")]
pub async fn edit_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<ListingPath>,
) -> HttpResponse {
    let show_target = show_path(&path.id);
    match try_edit_form(&state, &session, &path).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::new(INDEX_PATH, show_target.clone(), show_target, WENT_WRONG),
        ),
    }
}

async fn try_edit_form(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
) -> Result<EditPage, Error> {
    let id = parse_listing_id(path)?;
    let account = state.require_account(session).await?;
    let listing = state.listing_query.edit_view(account.id(), &id).await?;
    let flash = session.take_flashes()?;
    Ok(EditPage {
        flash,
        viewer: Some(ViewerResponse::from(&account)),
        fields: LISTING_EDIT_FIELDS.to_vec(),
        listing: ListingValuesResponse::from(&listing),
    })
}

/// Update an owned listing from the multipart form: `price` and an
/// optional replacement `image`. A submitted `furnitureName` is ignored.
#[utoipa::path(
    put,
    path = "/furniture/{id}",
    params(
        ("id" = String, Path, description = "Listing identifier")
    ),
    responses(
        (status = 303, description = "Redirect: the listing on success, its edit form on failure", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "updateFurniture"
)]
#[put("/furniture/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<ListingPath>,
    form: MultipartForm<UpdateListingForm>,
) -> HttpResponse {
    let routing = ErrorRouting::new(
        edit_path(&path.id),
        show_path(&path.id),
        edit_path(&path.id),
        UPDATE_FAILED,
    );
    match try_update(&state, &session, &path, form.into_inner()).await {
        Ok(listing) => {
            flash_or_log(&session, Flash::success(UPDATED));
            see_other(&show_path(listing.id().as_ref()))
        }
        Err(error) => redirect_for_error(&session, &request, &error, &routing),
    }
}

async fn try_update(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
    form: UpdateListingForm,
) -> Result<Listing, Error> {
    let id = parse_listing_id(path)?;
    let account = state.require_account(session).await?;
    let price = Price::parse(&form.price).map_err(map_listing_validation_error)?;
    let image = match submitted_image(form.image.as_ref()) {
        Some(file) => {
            let upload = validate_image(file)?;
            Some(
                state
                    .images
                    .save(upload)
                    .await
                    .map_err(map_image_store_error)?,
            )
        }
        None => None,
    };
    state
        .listing_command
        .update(account.id(), &id, ListingUpdate { price, image })
        .await
}

/// Delete an owned listing.
#[utoipa::path(
    delete,
    path = "/furniture/{id}",
    params(
        ("id" = String, Path, description = "Listing identifier")
    ),
    responses(
        (status = 303, description = "Redirect to /furniture", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["furniture"],
    operation_id = "deleteFurniture"
)]
#[delete("/furniture/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<ListingPath>,
) -> HttpResponse {
    let routing = ErrorRouting::new(
        INDEX_PATH,
        show_path(&path.id),
        INDEX_PATH,
        DELETE_FAILED,
    );
    match try_delete(&state, &session, &path).await {
        Ok(()) => {
            flash_or_log(&session, Flash::success(DELETED));
            see_other(INDEX_PATH)
        }
        Err(error) => redirect_for_error(&session, &request, &error, &routing),
    }
}

async fn try_delete(
    state: &HttpState,
    session: &SessionContext,
    path: &ListingPath,
) -> Result<(), Error> {
    let id = parse_listing_id(path)?;
    let account = state.require_account(session).await?;
    state.listing_command.delete(account.id(), &id).await
}

fn map_listing_validation_error(error: ListingValidationError) -> Error {
    let (field, code) = match &error {
        ListingValidationError::EmptyId | ListingValidationError::InvalidId => {
            ("id", "invalid_id")
        }
        ListingValidationError::EmptyName => ("furnitureName", "empty_furniture_name"),
        ListingValidationError::NameTooLong { .. } => ("furnitureName", "furniture_name_too_long"),
        ListingValidationError::PriceNotANumber => ("price", "price_not_a_number"),
        ListingValidationError::PriceOutOfRange => ("price", "price_out_of_range"),
        ListingValidationError::EmptyImage => ("image", "empty_image"),
    };
    Error::invalid_request(error.to_string())
        .with_details(serde_json::json!({ "field": field, "code": code }))
}

fn map_image_store_error(error: ImageStoreError) -> Error {
    Error::persistence(error.to_string())
}

#[cfg(test)]
#[path = "listings_tests.rs"]
mod tests;
