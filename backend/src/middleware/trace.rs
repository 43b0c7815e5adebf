//! Per-request trace identifiers.
//!
//! The [`Trace`] middleware assigns each incoming request a random
//! identifier, keeps it in Tokio task-local storage for the duration of the
//! handler, and stamps it on the response as a `trace-id` header. Domain
//! errors capture the identifier at construction so log lines, error
//! payloads, and responses correlate.
//!
//! Task-local values do not cross `tokio::spawn` boundaries; wrap spawned
//! work in [`TraceId::scope`] when the identifier must propagate.

use std::future::Future;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::error;
use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Request-scoped trace identifier exposed via task-local storage.
///
/// Renders as 32 lowercase hex characters; hyphenated UUID forms also parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the trace identifier of the request being handled, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `id` in scope.
    pub async fn scope<Fut>(id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Middleware attaching a trace identifier to every request and response.
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { inner: service }))
    }
}

/// Service wrapper produced by [`Trace`]; not used directly.
pub struct TraceMiddleware<S> {
    inner: S,
}

fn stamp_trace_header<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::try_from(trace_id.to_string()) {
        Ok(value) => {
            res.headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(err) => {
            error!(error = %err, trace_id = %trace_id, "trace header encoding failed");
        }
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let id = TraceId::generate();
        let downstream = self.inner.call(req);
        Box::pin(TraceId::scope(id, async move {
            let mut res = downstream.await?;
            stamp_trace_header(&mut res, id);
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{TestRequest, call_service, init_service, read_body};
    use actix_web::{App, HttpResponse, web};

    #[tokio::test]
    async fn current_reflects_scope() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async move { TraceId::current() }).await;
        assert_eq!(seen, Some(id));
    }

    #[tokio::test]
    async fn current_is_none_out_of_scope() {
        assert!(TraceId::current().is_none());
    }

    #[test]
    fn display_is_compact_lowercase_hex() {
        let rendered = TraceId::generate().to_string();
        assert_eq!(rendered.len(), 32);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rendered, rendered.to_lowercase());
    }

    #[test]
    fn parses_both_display_and_hyphenated_forms() {
        let id = TraceId::generate();
        let compact: TraceId = id.to_string().parse().expect("compact form parses");
        assert_eq!(compact, id);

        let hyphenated: TraceId = "00000000-0000-0000-0000-000000000000"
            .parse()
            .expect("hyphenated form parses");
        assert_eq!(hyphenated.to_string(), "0".repeat(32));
    }

    #[actix_web::test]
    async fn responses_carry_the_trace_header() {
        let app = init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(|| async { HttpResponse::NoContent().finish() })),
        )
        .await;
        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;
        let header = res.headers().get(TRACE_ID_HEADER).expect("trace id header");
        let parsed: TraceId = header
            .to_str()
            .expect("ascii header")
            .parse()
            .expect("header parses as a trace id");
        assert_eq!(parsed.to_string().len(), 32);
    }

    #[actix_web::test]
    async fn handlers_observe_the_response_trace_id() {
        let app = init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async {
                let seen = TraceId::current().expect("trace id in scope");
                HttpResponse::Ok().body(seen.to_string())
            }),
        ))
        .await;
        let res = call_service(&app, TestRequest::get().uri("/").to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .expect("trace id header");
        let body = read_body(res).await;
        assert_eq!(header.as_bytes(), body.as_ref());
    }
}
