//! Field checks shared by request models.
//!
//! Each check records a message against the field in a [`FieldErrors`] collection instead of
//! returning early, so one response reports every problem with a request. [`JsonBody`] applies
//! the same shape to bodies that don't deserialize at all.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::errors::{Error, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_VALUE: &str = "Enter a valid value.";

/// Errors not tied to a single field are reported under this key.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// JSON request body extractor.
///
/// Malformed JSON or a missing `application/json` content type is a plain bad request. A
/// well-formed body whose values have the wrong type is a validation error against the field
/// that failed, e.g. `{"errors": {"price": ["Enter a valid value."]}}`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<serde_json::Value>::from_request(req, state)
            .await
            .map_err(|rejection| Error::BadRequest {
                message: rejection.body_text(),
            })?;

        serde_path_to_error::deserialize(value).map(JsonBody).map_err(|err| {
            let path = err.path().to_string();
            let mut errors = FieldErrors::new();
            if path == "." {
                errors.add(NON_FIELD_ERRORS, err.into_inner().to_string());
            } else {
                errors.add(&path, INVALID_VALUE);
            }
            Error::Validation { errors }
        })
    }
}

/// Record an error if `value` is blank or longer than `max` characters.
pub fn required_text(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
    } else {
        max_length(field, value, max, errors);
    }
}

/// Record an error if `value` is longer than `max` characters.
pub fn max_length(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    let len = value.trim().chars().count();
    if len > max {
        errors.add(field, format!("Ensure this value has at most {max} characters (it has {len})."));
    }
}
