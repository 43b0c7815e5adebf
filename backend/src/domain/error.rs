//! Domain error type shared across services, adapters, and handlers.
//!
//! Every fallible operation surfaces an [`Error`] carrying a stable
//! machine-readable [`ErrorCode`], a human-readable message, optional
//! structured details, and the trace identifier active when the error was
//! constructed. The [`actix_web::ResponseError`] impl turns escaped errors
//! into JSON payloads with a `trace-id` correlation header; storage and
//! internal failures are redacted before leaving the process.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

/// Convenient alias for handler and service results.
pub type ApiResult<T> = Result<T, Error>;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request is malformed or fails field validation.
    InvalidRequest,
    /// Credential verification failed.
    Unauthorized,
    /// No signed-in user is attached to the session.
    Unauthenticated,
    /// Signed in, but not the owner of the targeted resource.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The uploaded file is not an accepted image type.
    UploadRejected,
    /// The underlying store failed to complete an operation.
    PersistenceError,
    /// An unexpected error occurred on the server.
    InternalError,
}

impl ErrorCode {
    /// Wire representation, matching the serde rename.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::UploadRejected => "upload_rejected",
            Self::PersistenceError => "persistence_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload returned by the API and passed between layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// Stable machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable message; shown to users via flash messages.
    pub message: String,
    /// Correlation identifier captured when the error was constructed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Supplementary structured details (e.g. offending field).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Error {
    /// Build an error with the given code and message, capturing the
    /// current trace identifier if one is in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn upload_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UploadRejected, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Copy safe to serialize to clients: storage and internal failures
    /// keep their code and trace id but lose message and details.
    fn redacted(&self) -> Self {
        match self.code {
            ErrorCode::PersistenceError | ErrorCode::InternalError => Self {
                code: self.code,
                message: "Internal server error".into(),
                trace_id: self.trace_id.clone(),
                details: None,
            },
            _ => self.clone(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest | ErrorCode::UploadRejected => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized | ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PersistenceError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(value) = self
            .trace_id
            .as_deref()
            .and_then(|id| HeaderValue::from_str(id).ok())
        {
            builder.insert_header((HeaderName::from_static(TRACE_ID_HEADER), value));
        }
        builder.json(self.redacted())
    }
}

/// Adapt framework-level failures (extractor errors, malformed bodies) so
/// they flow through the same response shape as domain errors.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        let message = err.to_string();
        match status {
            StatusCode::BAD_REQUEST => Self::invalid_request(message),
            StatusCode::UNAUTHORIZED => Self::unauthorized(message),
            StatusCode::FORBIDDEN => Self::forbidden(message),
            StatusCode::NOT_FOUND => Self::not_found(message),
            _ => Self::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::upload_rejected("bad type"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
    #[case(Error::unauthenticated("anon"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::persistence("db down"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes_match_error_codes(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[rstest]
    #[case(Error::persistence("insert exploded"))]
    #[case(Error::internal("stack trace here"))]
    fn server_side_failures_are_redacted(#[case] error: Error) {
        let redacted = error.redacted();
        assert_eq!(redacted.message, "Internal server error");
        assert!(redacted.details.is_none());
        assert_eq!(redacted.code, error.code);
    }

    #[test]
    fn client_errors_keep_message_and_details() {
        let error = Error::invalid_request("price must be a non-negative number")
            .with_details(json!({"field": "price", "code": "out_of_range"}));
        let redacted = error.redacted();
        assert_eq!(redacted, error);
    }

    #[tokio::test]
    async fn trace_id_is_captured_in_scope() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid uuid");
        let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
        assert_eq!(
            error.trace_id.as_deref(),
            Some(trace_id.to_string().as_str())
        );
    }

    #[test]
    fn trace_id_is_absent_out_of_scope() {
        assert!(Error::internal("boom").trace_id.is_none());
    }

    #[actix_web::test]
    async fn error_response_carries_header_and_redacted_body() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000002"
            .parse()
            .expect("valid uuid");
        let error = TraceId::scope(trace_id, async { Error::persistence("pool checkout") }).await;
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
            Some(trace_id.to_string().as_str())
        );
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let payload: Error = serde_json::from_slice(&body).expect("error payload");
        assert_eq!(payload.message, "Internal server error");
    }

    #[test]
    fn framework_errors_map_by_status() {
        let err: Error = actix_web::error::ErrorNotFound("no such route").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        let err: Error = actix_web::error::ErrorBadRequest("bad payload").into();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        let err: Error = actix_web::error::ErrorImATeapot("teapot").into();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn wire_form_uses_snake_case_codes() {
        let error = Error::upload_rejected("upload an image file (jpeg, jpg, png, gif)");
        let value = serde_json::to_value(&error).expect("serializes");
        assert_eq!(value["code"], "upload_rejected");
    }
}
