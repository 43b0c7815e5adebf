//! Account handlers: registration, login, logout, and their form views.
//!
//! ```text
//! GET  /register  -> registration form descriptor
//! POST /register  -> create the account, sign in, redirect
//! GET  /login     -> login form descriptor
//! POST /login     -> authenticate, redirect to the saved target or /furniture
//! GET  /logout    -> drop the signed-in user, redirect
//! ```
//!
//! The mutating routes answer `303 See Other` for every outcome; the only
//! JSON they produce is the extractor's own `400` for a body that is not a
//! well-formed urlencoded form.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Credentials, CredentialsError, Error, LOGIN_FIELDS, NewAccount, REGISTRATION_FIELDS,
    RegistrationValidationError, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redirects::{
    ErrorRouting, INDEX_PATH, LOGIN_PATH, WENT_WRONG, flash_or_log, redirect_for_error, see_other,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{Flash, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{FormPage, page_chrome};

pub(crate) const REGISTER_PATH: &str = "/register";

const WELCOME: &str = "Welcome to Furniture App!";
const WELCOME_BACK: &str = "Welcome back!";
const GOODBYE: &str = "Goodbye!";

/// Urlencoded body for `POST /register`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub age: String,
    pub location: String,
}

impl TryFrom<RegisterForm> for NewAccount {
    type Error = RegistrationValidationError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            form.username,
            form.password,
            form.phone_number,
            &form.age,
            form.location,
        )
    }
}

/// Urlencoded body for `POST /login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = CredentialsError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        Self::try_from_parts(form.username, form.password)
    }
}

/// Serve the registration form descriptor.
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration form descriptor", body = FormPage),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "registrationForm",
    security([])
)]
#[get("/register")]
pub async fn registration_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FormPage>> {
    let chrome = page_chrome(&state, &session).await?;
    Ok(web::Json(FormPage {
        flash: chrome.flash,
        viewer: chrome.viewer,
        fields: REGISTRATION_FIELDS.to_vec(),
    }))
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect: /furniture on success, /register on failure", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    form: web::Form<RegisterForm>,
) -> HttpResponse {
    match try_register(&state, &session, form.into_inner()).await {
        Ok(()) => {
            flash_or_log(&session, Flash::success(WELCOME));
            see_other(INDEX_PATH)
        }
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::uniform(REGISTER_PATH, WENT_WRONG),
        ),
    }
}

async fn try_register(
    state: &HttpState,
    session: &SessionContext,
    form: RegisterForm,
) -> Result<(), Error> {
    let account = NewAccount::try_from(form).map_err(map_registration_error)?;
    let user = state.registration.register(account).await?;
    session.persist_user(user.id())
}

/// Serve the login form descriptor.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form descriptor", body = FormPage),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "loginForm",
    security([])
)]
#[get("/login")]
pub async fn login_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FormPage>> {
    let chrome = page_chrome(&state, &session).await?;
    Ok(web::Json(FormPage {
        flash: chrome.flash,
        viewer: chrome.viewer,
        fields: LOGIN_FIELDS.to_vec(),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect: the saved return target (else /furniture) on success, /login on failure", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    match try_login(&state, &session, form.into_inner()).await {
        Ok(target) => {
            flash_or_log(&session, Flash::success(WELCOME_BACK));
            see_other(&target)
        }
        Err(error) => redirect_for_error(
            &session,
            &request,
            &error,
            &ErrorRouting::uniform(LOGIN_PATH, WENT_WRONG),
        ),
    }
}

async fn try_login(
    state: &HttpState,
    session: &SessionContext,
    form: LoginForm,
) -> Result<String, Error> {
    let credentials = Credentials::try_from(form).map_err(map_credentials_error)?;
    let user = state.login.authenticate(credentials).await?;
    session.persist_user(user.id())?;
    Ok(session
        .take_return_to()?
        .unwrap_or_else(|| INDEX_PATH.to_owned()))
}

/// Sign the user out and send them back to the marketplace.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Redirect to /furniture", headers(
            ("Location" = String, description = "Redirect target")
        ))
    ),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[get("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    flash_or_log(&session, Flash::success(GOODBYE));
    see_other(INDEX_PATH)
}

fn map_registration_error(error: RegistrationValidationError) -> Error {
    let (field, code) = match &error {
        RegistrationValidationError::User(user_error) => match user_error {
            UserValidationError::EmptyId | UserValidationError::InvalidId => ("id", "invalid_id"),
            UserValidationError::EmptyUsername => ("username", "empty_username"),
            UserValidationError::UsernameTooShort { .. } => ("username", "username_too_short"),
            UserValidationError::UsernameTooLong { .. } => ("username", "username_too_long"),
            UserValidationError::UsernameInvalidCharacters => {
                ("username", "username_invalid_characters")
            }
            UserValidationError::EmptyPhoneNumber => ("phoneNumber", "empty_phone_number"),
            UserValidationError::PhoneNumberTooLong { .. } => {
                ("phoneNumber", "phone_number_too_long")
            }
            UserValidationError::PhoneNumberInvalidCharacters => {
                ("phoneNumber", "phone_number_invalid_characters")
            }
            UserValidationError::AgeNotANumber => ("age", "age_not_a_number"),
            UserValidationError::AgeOutOfRange { .. } => ("age", "age_out_of_range"),
            UserValidationError::EmptyLocation => ("location", "empty_location"),
            UserValidationError::LocationTooLong { .. } => ("location", "location_too_long"),
        },
        RegistrationValidationError::EmptyPassword => ("password", "empty_password"),
        RegistrationValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        RegistrationValidationError::PasswordTooLong { .. } => ("password", "password_too_long"),
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn map_credentials_error(error: CredentialsError) -> Error {
    let (field, code) = match error {
        CredentialsError::EmptyUsername => ("username", "empty_username"),
        CredentialsError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field, "code": code }))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
