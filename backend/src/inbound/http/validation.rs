//! Shared validation helpers for inbound HTTP adapters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::domain::{CustomerId, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidCustomerId,
    InvalidInteger,
    InvalidDate,
    UnexpectedParameter,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidCustomerId => "invalid_customer_id",
            ErrorCode::InvalidInteger => "invalid_integer",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::UnexpectedParameter => "unexpected_parameter",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Missing-field error carrying a route-specific client message.
pub(crate) fn required_fields_error(message: &str, fields: &[FieldName]) -> Error {
    let names: Vec<_> = fields.iter().map(FieldName::as_str).collect();
    Error::invalid_request(message).with_details(json!({
        "fields": names,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Accept `value` only when present and not blank.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

pub(crate) fn parse_customer_id(value: String, field: FieldName) -> Result<CustomerId, Error> {
    CustomerId::new(value.as_str()).map_err(|err| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} is invalid: {err}"))
            .with_value(ErrorCode::InvalidCustomerId, value)
    })
}

/// Parse a circuit breaker id, which must be an integer.
pub(crate) fn parse_cb_id(value: &str, field: FieldName) -> Result<i64, Error> {
    value.trim().parse::<i64>().map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be an integer"))
            .with_value(ErrorCode::InvalidInteger, value)
    })
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_iso_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be a YYYY-MM-DD date"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

/// Reject query parameters outside `allowed`, listing them under
/// `unexpectedParams`.
pub(crate) fn reject_unexpected_params(
    query: &BTreeMap<String, String>,
    allowed: &[&str],
) -> Result<(), Error> {
    let unexpected: Vec<&str> = query
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();
    if unexpected.is_empty() {
        return Ok(());
    }
    Err(Error::invalid_request("Unexpected parameters").with_details(json!({
        "unexpectedParams": unexpected,
        "code": ErrorCode::UnexpectedParameter.as_str(),
    })))
}

/// Keys of `body` outside `allowed`, in document order.
pub(crate) fn unknown_fields<'a>(
    body: &'a serde_json::Map<String, Value>,
    allowed: &[&str],
) -> Vec<&'a str> {
    body.keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect()
}
