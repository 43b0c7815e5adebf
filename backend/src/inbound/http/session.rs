//! Cookie-session state as domain-friendly operations.
//!
//! Handlers never touch the raw Actix session. They go through
//! [`SessionContext`], which knows about the signed-in user id, the one-shot
//! flash queue, and the post-login return target. All three live in the same
//! signed cookie.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FLASH_KEY: &str = "flash";
pub(crate) const RETURN_TO_KEY: &str = "return_to";

/// Severity of a queued flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot notice shown on the next rendered view and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Typed facade over the session cookie.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record the signed-in user. Effective for subsequent requests once the
    /// response cookie is set.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to store signed-in user: {error}")))
    }

    /// The signed-in user, or `None` for anonymous visitors. A stored id that
    /// no longer parses is treated as anonymous rather than an error.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read signed-in user: {error}")))?;
        let Some(raw) = stored else {
            return Ok(None);
        };
        match UserId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(error) => {
                tracing::warn!("discarding malformed user id from session: {error}");
                Ok(None)
            }
        }
    }

    /// The signed-in user, or an unauthenticated error for anonymous ones.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthenticated("login required"))
    }

    /// Queue a flash message behind any already waiting.
    pub fn flash(&self, flash: Flash) -> Result<(), Error> {
        let mut queue = self.pending_flashes()?;
        queue.push(flash);
        self.0
            .insert(FLASH_KEY, queue)
            .map_err(|error| Error::internal(format!("failed to queue flash: {error}")))
    }

    /// Drain the flash queue. Messages are shown exactly once.
    pub fn take_flashes(&self) -> Result<Vec<Flash>, Error> {
        let queue = self.pending_flashes()?;
        self.0.remove(FLASH_KEY);
        Ok(queue)
    }

    fn pending_flashes(&self) -> Result<Vec<Flash>, Error> {
        Ok(self
            .0
            .get::<Vec<Flash>>(FLASH_KEY)
            .map_err(|error| Error::internal(format!("failed to read flash queue: {error}")))?
            .unwrap_or_default())
    }

    /// Remember where to send the user after they sign in. Only same-site
    /// paths are kept; anything else is dropped.
    pub fn save_return_to(&self, target: &str) -> Result<(), Error> {
        if !target.starts_with('/') || target.starts_with("//") {
            return Ok(());
        }
        self.0
            .insert(RETURN_TO_KEY, target)
            .map_err(|error| Error::internal(format!("failed to save return target: {error}")))
    }

    /// Consume the saved post-login target, if any.
    pub fn take_return_to(&self) -> Result<Option<String>, Error> {
        let target = self
            .0
            .get::<String>(RETURN_TO_KEY)
            .map_err(|error| Error::internal(format!("failed to read return target: {error}")))?;
        self.0.remove(RETURN_TO_KEY);
        Ok(target)
    }

    /// Drop the signed-in user and any saved return target. Queued flash
    /// messages survive so a goodbye notice can still render.
    pub fn sign_out(&self) {
        self.0.remove(USER_ID_KEY);
        self.0.remove(RETURN_TO_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const FIXTURE_ID: &str = "b6d9a1e4-52c7-4f0e-9b3a-8d41c5e6f702";

    fn fixture_user() -> UserId {
        UserId::new(FIXTURE_ID).expect("fixture id")
    }

    fn session_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn session_cookie(
        res: &actix_web::dev::ServiceResponse,
    ) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn signed_in_user_survives_the_cookie_round_trip() {
        let app = test::init_service(
            session_app()
                .route(
                    "/store",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&fixture_user())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/who",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                    }),
                ),
        )
        .await;

        let stored =
            test::call_service(&app, test::TestRequest::get().uri("/store").to_request()).await;
        assert_eq!(stored.status(), StatusCode::OK);
        let cookie = session_cookie(&stored);

        let who = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/who")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(who.status(), StatusCode::OK);
        assert_eq!(test::read_body(who).await, FIXTURE_ID);
    }

    #[actix_web::test]
    async fn anonymous_visitors_fail_the_guard() {
        let app = test::init_service(session_app().route(
            "/guard",
            web::get().to(|session: SessionContext| async move {
                let _ = session.require_user_id()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let rejected =
            test::call_service(&app, test::TestRequest::get().uri("/guard").to_request()).await;
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_user_id_resolves_to_anonymous() {
        let app = test::init_service(
            session_app()
                .route(
                    "/corrupt",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not-a-uuid")
                            .expect("store corrupt user id");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/guard",
                    web::get().to(|session: SessionContext| async move {
                        let _ = session.require_user_id()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let corrupted =
            test::call_service(&app, test::TestRequest::get().uri("/corrupt").to_request()).await;
        let cookie = session_cookie(&corrupted);

        let rejected = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/guard")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn sign_out_forgets_the_user_but_keeps_flashes() {
        let app = test::init_service(
            session_app()
                .route(
                    "/sign-in",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&fixture_user())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/sign-out",
                    web::get().to(|session: SessionContext| async move {
                        session.sign_out();
                        session.flash(Flash::success("Goodbye!"))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/check",
                    web::get().to(|session: SessionContext| async move {
                        let user = session.user_id()?.map(|id| id.to_string());
                        let flashes = session.take_flashes()?;
                        Ok::<_, Error>(HttpResponse::Ok().json((user, flashes)))
                    }),
                ),
        )
        .await;

        let signed_in =
            test::call_service(&app, test::TestRequest::get().uri("/sign-in").to_request()).await;
        let cookie = session_cookie(&signed_in);

        let signed_out = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/sign-out")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&signed_out);

        let check = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/check")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let (user, flashes): (Option<String>, Vec<Flash>) = test::read_body_json(check).await;
        assert_eq!(user, None);
        assert_eq!(flashes, vec![Flash::success("Goodbye!")]);
    }

    #[actix_web::test]
    async fn flash_queue_drains_exactly_once() {
        let app = test::init_service(
            session_app()
                .route(
                    "/queue",
                    web::get().to(|session: SessionContext| async move {
                        session.flash(Flash::error("Password or username is incorrect"))?;
                        session.flash(Flash::success("Welcome back!"))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/drain",
                    web::get().to(|session: SessionContext| async move {
                        let flashes = session.take_flashes()?;
                        Ok::<_, Error>(HttpResponse::Ok().json(flashes))
                    }),
                ),
        )
        .await;

        let queue_res =
            test::call_service(&app, test::TestRequest::get().uri("/queue").to_request()).await;
        let cookie = session_cookie(&queue_res);

        let drain_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let drained_cookie = session_cookie(&drain_res);
        let flashes: Vec<Flash> = test::read_body_json(drain_res).await;
        assert_eq!(
            flashes,
            vec![
                Flash::error("Password or username is incorrect"),
                Flash::success("Welcome back!"),
            ]
        );

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(drained_cookie)
                .to_request(),
        )
        .await;
        let flashes: Vec<Flash> = test::read_body_json(second).await;
        assert!(flashes.is_empty());
    }

    #[actix_web::test]
    async fn return_target_is_consumed_and_same_site_only() {
        let app = test::init_service(
            session_app()
                .route(
                    "/remember",
                    web::get().to(|session: SessionContext| async move {
                        session.save_return_to("/furniture/42/edit")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/remember-external",
                    web::get().to(|session: SessionContext| async move {
                        session.save_return_to("https://example.com/phish")?;
                        session.save_return_to("//example.com/phish")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/consume",
                    web::get().to(|session: SessionContext| async move {
                        let target = session.take_return_to()?;
                        Ok::<_, Error>(
                            HttpResponse::Ok().body(target.unwrap_or_else(|| "none".to_owned())),
                        )
                    }),
                ),
        )
        .await;

        let remember_res =
            test::call_service(&app, test::TestRequest::get().uri("/remember").to_request()).await;
        let cookie = session_cookie(&remember_res);
        let consume_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/consume")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let follow_up = session_cookie(&consume_res);
        let body = test::read_body(consume_res).await;
        assert_eq!(body, "/furniture/42/edit");

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/consume")
                .cookie(follow_up)
                .to_request(),
        )
        .await;
        let body = test::read_body(second).await;
        assert_eq!(body, "none");

        let external_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/remember-external")
                .to_request(),
        )
        .await;
        assert_eq!(external_res.status(), StatusCode::OK);
        let stored = external_res
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session");
        assert!(!stored, "external targets must not touch the session");
    }
}
