//! Shared fixtures for integration suites exercising the assembled app.
//!
//! Unlike the in-crate handler tests, these helpers wire the real Argon2
//! hasher and the on-disk image store so whole flows run end to end,
//! multipart uploads included.

use std::path::Path;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use backend::domain::ports::MemoryStore;
use backend::domain::{AccountService, ListingService};
use backend::inbound::http::accounts::{
    RegisterForm, login, login_form, logout, register, registration_form,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::listings::{
    create, delete_listing, edit_form, index, new_form, root, show, update,
};
use backend::inbound::http::state::HttpState;
use backend::middleware::Trace;
use backend::outbound::security::Argon2PasswordHasher;
use backend::outbound::storage::DiskImageStore;

pub const BOUNDARY: &str = "integration-test-boundary";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00";
pub const PASSWORD: &str = "correct horse";

/// Real services over shared in-memory repositories, Argon2 hashing, and
/// an image store rooted at `upload_dir`.
pub fn live_state(upload_dir: &Path) -> (HttpState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let accounts = Arc::new(AccountService::new(
        store.clone(),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let listings = Arc::new(ListingService::new(store.clone(), store.clone()));
    let state = HttpState {
        registration: accounts.clone(),
        login: accounts,
        listing_query: listings.clone(),
        listing_command: listings,
        images: Arc::new(DiskImageStore::new(upload_dir)),
    };
    (state, store)
}

/// Session middleware matching the production settings, minus `Secure`
/// so the test client can ride plain HTTP.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::days(7)))
        .build()
}

/// The full route table, already marked ready so probes answer 200.
pub fn full_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health = HealthState::new();
    health.mark_ready();
    // `/furniture/new` must register before `/furniture/{id}`.
    App::new()
        .app_data(web::Data::new(health))
        .app_data(web::Data::new(state))
        .wrap(session_middleware())
        .wrap(Trace)
        .service(registration_form)
        .service(register)
        .service(login_form)
        .service(login)
        .service(logout)
        .service(root)
        .service(index)
        .service(new_form)
        .service(create)
        .service(show)
        .service(edit_form)
        .service(update)
        .service(delete_listing)
        .service(ready)
        .service(live)
}

pub fn location(response: &ServiceResponse) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ascii redirect target")
}

pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

fn push_line(body: &mut Vec<u8>, line: &str) {
    body.extend_from_slice(line.as_bytes());
    body.extend_from_slice(b"\r\n");
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        push_line(&mut body, &format!("--{BOUNDARY}"));
        push_line(
            &mut body,
            &format!("Content-Disposition: form-data; name=\"{name}\""),
        );
        push_line(&mut body, "");
        push_line(&mut body, value);
    }
    if let Some(file) = file {
        push_line(&mut body, &format!("--{BOUNDARY}"));
        push_line(
            &mut body,
            &format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                file.field, file.file_name
            ),
        );
        push_line(&mut body, &format!("Content-Type: {}", file.content_type));
        push_line(&mut body, "");
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    push_line(&mut body, &format!("--{BOUNDARY}--"));
    body
}

pub fn multipart_request(
    method: actix_test::TestRequest,
    uri: &str,
    body: Vec<u8>,
) -> actix_test::TestRequest {
    method
        .uri(uri)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

/// Register `username` and hand back the authenticated session cookie.
pub async fn register_account(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    username: &str,
) -> Cookie<'static> {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: username.to_owned(),
                password: PASSWORD.to_owned(),
                phone_number: "07700 900123".to_owned(),
                age: "37".to_owned(),
                location: "Bristol".to_owned(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(location(&response), "/furniture");
    session_cookie(&response)
}

/// Create a listing from `file` and return (listing path, fresh cookie).
pub async fn create_listing(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: Cookie<'static>,
    name: &str,
    price: &str,
    file: FilePart<'_>,
) -> (String, Cookie<'static>) {
    let body = multipart_body(&[("furnitureName", name), ("price", price)], Some(file));
    let response = actix_test::call_service(
        app,
        multipart_request(actix_test::TestRequest::post(), "/furniture", body)
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).to_owned();
    assert!(target.starts_with("/furniture/"), "created path: {target}");
    (target, session_cookie(&response))
}

pub async fn fetch_page(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    path: &str,
    cookie: Option<Cookie<'static>>,
) -> Value {
    let mut request = actix_test::TestRequest::get().uri(path);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    assert!(response.status().is_success(), "page fetch for {path}");
    actix_test::read_body_json(response).await
}

pub fn flash_messages(page: &Value) -> Vec<(String, String)> {
    page.get("flash")
        .and_then(Value::as_array)
        .expect("flash array")
        .iter()
        .map(|entry| {
            (
                entry
                    .get("level")
                    .and_then(Value::as_str)
                    .expect("flash level")
                    .to_owned(),
                entry
                    .get("message")
                    .and_then(Value::as_str)
                    .expect("flash message")
                    .to_owned(),
            )
        })
        .collect()
}
