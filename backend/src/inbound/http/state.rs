//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ImageStore, ListingCommand, ListingQuery, LoginService, RegistrationService,
};
use crate::domain::{Error, User};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub listing_query: Arc<dyn ListingQuery>,
    pub listing_command: Arc<dyn ListingCommand>,
    pub images: Arc<dyn ImageStore>,
}

impl HttpState {
    /// Resolve the session's user id to an account for page chrome. A
    /// stale id whose account has vanished renders as anonymous.
    pub async fn resolve_viewer(&self, session: &SessionContext) -> Result<Option<User>, Error> {
        match session.user_id()? {
            Some(id) => self.login.current_user(&id).await,
            None => Ok(None),
        }
    }

    /// The login-required guard for protected routes: resolve the session
    /// to a live account or fail as unauthenticated. A stale id fails the
    /// same way a missing one does.
    pub async fn require_account(&self, session: &SessionContext) -> Result<User, Error> {
        let id = session.require_user_id()?;
        self.login
            .current_user(&id)
            .await?
            .ok_or_else(|| Error::unauthenticated("login required"))
    }
}
