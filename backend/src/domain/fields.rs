//! Typed field-constraint tables.
//!
//! One table per form, consumed twice: served verbatim by the form
//! endpoints so clients can render inputs, and mirrored by the validation
//! run before any persistence call. Constraint values come from the same
//! constants the value types enforce, so the two cannot drift.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::auth::{PASSWORD_MAX, PASSWORD_MIN};
use crate::domain::listing::LISTING_NAME_MAX;
use crate::domain::user::{AGE_MAX, AGE_MIN, LOCATION_MAX, PHONE_MAX, USERNAME_MAX, USERNAME_MIN};

/// File types accepted for listing images, matched against both the
/// filename extension and the declared content type.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// Input widget category for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
    Number,
    File,
}

/// Declarative constraints for a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[schema(value_type = String)]
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub pattern: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub accept: Option<&'static [&'static str]>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            pattern: None,
            accept: None,
        }
    }

    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    const fn min_value(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    const fn accept(mut self, types: &'static [&'static str]) -> Self {
        self.accept = Some(types);
        self
    }
}

/// Fields collected by `POST /register`.
pub const REGISTRATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("username", FieldKind::Text)
        .length(USERNAME_MIN, USERNAME_MAX)
        .pattern("^[A-Za-z0-9_]+$"),
    FieldSpec::new("password", FieldKind::Password).length(PASSWORD_MIN, PASSWORD_MAX),
    FieldSpec::new("phoneNumber", FieldKind::Text)
        .max_length(PHONE_MAX)
        .pattern(r"^[0-9+()\- ]+$"),
    FieldSpec::new("age", FieldKind::Number).range(AGE_MIN as f64, AGE_MAX as f64),
    FieldSpec::new("location", FieldKind::Text).max_length(LOCATION_MAX),
];

/// Fields collected by `POST /login`.
pub const LOGIN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("username", FieldKind::Text),
    FieldSpec::new("password", FieldKind::Password),
];

/// Fields collected by `POST /furniture`.
pub const LISTING_CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("furnitureName", FieldKind::Text).max_length(LISTING_NAME_MAX),
    FieldSpec::new("price", FieldKind::Number).min_value(0.0),
    FieldSpec::new("image", FieldKind::File).accept(ALLOWED_IMAGE_TYPES),
];

/// Fields collected by `PUT /furniture/{id}`. The name is immutable after
/// creation, so the edit form has no name field at all.
pub const LISTING_EDIT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("price", FieldKind::Number).min_value(0.0),
    FieldSpec::new("image", FieldKind::File)
        .optional()
        .accept(ALLOWED_IMAGE_TYPES),
];
