//! Flash-and-redirect plumbing for the server-rendered flow.
//!
//! Mutating routes never answer with an error page. Each one carries an
//! [`ErrorRouting`] describing where each failure class sends the user;
//! [`redirect_for_error`] queues the matching flash message and answers
//! `303 See Other`. Flash texts for the guard failures are canned here;
//! validation and credential failures reuse the error's own message.

use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse};
use tracing::warn;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::session::{Flash, SessionContext};

pub(crate) const INDEX_PATH: &str = "/furniture";
pub(crate) const LOGIN_PATH: &str = "/login";

pub(crate) const SIGN_IN_REQUIRED: &str = "You must be signed in first!";
pub(crate) const NOT_PERMITTED: &str = "You do not have permission to do that!";
pub(crate) const LISTING_MISSING: &str = "Furniture not found!";
pub(crate) const WENT_WRONG: &str = "Something went wrong!";

/// Answer `303 See Other` pointing at `target`.
pub fn see_other(target: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, target))
        .finish()
}

/// Redirect targets and canned failure text for one route.
#[derive(Debug, Clone)]
pub struct ErrorRouting {
    retry: String,
    forbidden: String,
    fallback: String,
    failure_text: &'static str,
}

impl ErrorRouting {
    /// Routing with distinct targets per failure class. `retry` receives
    /// validation, upload, and credential failures; `forbidden` receives
    /// ownership failures; `fallback` receives storage and internal
    /// failures together with `failure_text` as the flash.
    pub fn new(
        retry: impl Into<String>,
        forbidden: impl Into<String>,
        fallback: impl Into<String>,
        failure_text: &'static str,
    ) -> Self {
        Self {
            retry: retry.into(),
            forbidden: forbidden.into(),
            fallback: fallback.into(),
            failure_text,
        }
    }

    /// Routing that sends every failure class to the same target.
    pub fn uniform(target: impl Into<String>, failure_text: &'static str) -> Self {
        let target = target.into();
        Self::new(target.clone(), target.clone(), target, failure_text)
    }
}

/// Convert a handler failure into a queued flash plus redirect.
///
/// Missing listings always land on the index; an unauthenticated request
/// lands on the login form with the original URL saved for after login.
/// Flash or return-target writes that fail are logged and skipped; the
/// redirect itself still happens.
pub fn redirect_for_error(
    session: &SessionContext,
    req: &HttpRequest,
    error: &Error,
    routing: &ErrorRouting,
) -> HttpResponse {
    let (message, target) = match error.code {
        ErrorCode::Unauthenticated => {
            if let Err(save_error) = session.save_return_to(&req.uri().to_string()) {
                warn!("failed to save return target: {save_error}");
            }
            (SIGN_IN_REQUIRED.to_owned(), LOGIN_PATH)
        }
        ErrorCode::NotFound => (LISTING_MISSING.to_owned(), INDEX_PATH),
        ErrorCode::Forbidden => (NOT_PERMITTED.to_owned(), routing.forbidden.as_str()),
        ErrorCode::InvalidRequest | ErrorCode::UploadRejected | ErrorCode::Unauthorized => {
            (error.message.clone(), routing.retry.as_str())
        }
        ErrorCode::PersistenceError | ErrorCode::InternalError => {
            (routing.failure_text.to_owned(), routing.fallback.as_str())
        }
    };
    flash_or_log(session, Flash::error(message));
    see_other(target)
}

/// Queue a flash; a failed session write is logged, never surfaced.
pub(crate) fn flash_or_log(session: &SessionContext, flash: Flash) {
    if let Err(flash_error) = session.flash(flash) {
        warn!("failed to queue flash: {flash_error}");
    }
}
