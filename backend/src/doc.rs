//! OpenAPI description of the HTTP surface.
//!
//! [`ApiDoc`] aggregates every endpoint plus the schema wrappers that
//! describe domain types without coupling them to utoipa. Swagger UI serves
//! the generated document in debug builds.

use crate::inbound::http::accounts::{LoginForm, RegisterForm};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::session::{Flash, FlashLevel};
use crate::inbound::http::views::{
    EditPage, FormPage, IndexPage, ListingResponse, ListingValuesResponse, OwnerResponse,
    ShowPage, ViewerResponse,
};
use crate::domain::{FieldKind, FieldSpec};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the session cookie as the document's security scheme.
struct SessionCookieScheme;

impl Modify for SessionCookieScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default)
            .add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Signed session cookie issued after registration or login.",
                ))),
            );
    }
}

/// OpenAPI document for the marketplace API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieScheme),
    info(
        title = "Furniture Market backend API",
        description = "Session-authenticated furniture marketplace: accounts, \
                       listings, and health probes.",
        license(name = "MIT", url = "https://opensource.org/license/mit/")
    ),
    servers(
        (url = "/", description = "Paths resolve against the serving origin")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::registration_form,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login_form,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::listings::root,
        crate::inbound::http::listings::index,
        crate::inbound::http::listings::new_form,
        crate::inbound::http::listings::create,
        crate::inbound::http::listings::show,
        crate::inbound::http::listings::edit_form,
        crate::inbound::http::listings::update,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        IndexPage,
        ShowPage,
        FormPage,
        EditPage,
        ListingResponse,
        ListingValuesResponse,
        OwnerResponse,
        ViewerResponse,
        Flash,
        FlashLevel,
        FieldSpec,
        FieldKind,
        RegisterForm,
        LoginForm,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "accounts", description = "Registration, login, and logout"),
        (name = "furniture", description = "Marketplace listings and their forms"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
