//! Documentation-only mirrors of the domain error types.
//!
//! The error type lives in the domain but its wire shape is an adapter
//! concern, so the schema wrappers are registered here and aliased onto
//! the domain paths with `#[schema(as = ...)]`.

use utoipa::ToSchema;

/// Wire codes carried by error payloads.
///
/// Documents [`crate::domain::ErrorCode`]; the two enums must list the same
/// variants.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode, rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails field validation.
    InvalidRequest,
    /// Credential verification failed.
    Unauthorized,
    /// No signed-in user is attached to the session.
    Unauthenticated,
    /// Signed in, but not the owner of the targeted resource.
    Forbidden,
    /// Nothing lives at the requested identifier.
    NotFound,
    /// The uploaded file is not an accepted image type.
    UploadRejected,
    /// The underlying store failed to complete an operation.
    PersistenceError,
    /// A failure the server cannot attribute to the request.
    InternalError,
}

/// Shape of the JSON error payload.
///
/// Documents [`crate::domain::Error`] without forcing utoipa into the
/// domain.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Machine-readable code, stable across releases.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message; shown to users via flash messages.
    #[schema(example = "username must be at least 3 characters")]
    message: String,
    /// Trace identifier matching the `trace-id` response header.
    #[schema(example = "9f2b4c1d8a7e4f30a1b2c3d4e5f60718")]
    trace_id: Option<String>,
    /// Optional structured context, such as per-field validation notes.
    details: Option<serde_json::Value>,
}
