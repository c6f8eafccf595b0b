//! Decoding and validation of JSON request bodies.
//!
//! Request types are plain `Deserialize + Validate` structs. Serde settles
//! the shape (unknown fields, missing fields, wrong types) and `validator`
//! the value rules. Both kinds of failure are reported as `{ field, message }`
//! pairs, with indexed paths such as `furniture[2].x` for nested input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrorsKind};

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All problems found in one payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = Vec::new();
        flatten(&errors, None, &mut out);
        out.sort_by(|a, b| a.field.cmp(&b.field));
        Self(out)
    }
}

fn flatten(errors: &validator::ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join(prefix, &camel_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| FieldError::new(path.clone(), describe(e))));
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (i, inner) in items {
                    flatten(inner, Some(&format!("{path}[{i}]")), out);
                }
            }
        }
    }
}

fn describe(error: &validator::ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("is invalid ({})", error.code),
    }
}

/// Decode `body` as `T`, then apply its validation rules.
///
/// Shape errors stop at the first one serde meets; rule violations are all
/// reported together.
pub fn parse<T>(body: Value) -> Result<T, ValidationErrors>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_path_to_error::deserialize(body).map_err(|e| {
        let path = e.path().to_string();
        ValidationErrors(vec![decode_error(&path, &e.into_inner().to_string())])
    })?;
    parsed.validate()?;
    Ok(parsed)
}

/// Missing and unknown field errors are raised on the enclosing object, so
/// the field name comes from the message.
fn decode_error(path: &str, message: &str) -> FieldError {
    let parent = (path != ".").then_some(path);

    if let Some(name) = quoted_after(message, "missing field `") {
        return FieldError::new(join(parent, name), "is required");
    }
    if let Some(name) = quoted_after(message, "unknown field `") {
        return FieldError::new(join(parent, name), "is not an accepted field");
    }
    FieldError::new(parent.unwrap_or("body"), message)
}

fn quoted_after<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    message.strip_prefix(prefix)?.split('`').next()
}

fn join(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}

/// `furniture_id` -> `furnitureId`, matching the wire names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// -- Field deserializers, for `#[serde(deserialize_with = "...")]` --

pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Null and blank both read as `None`. Pair with `#[serde(default)]`.
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// RFC 3339 timestamp or `YYYY-MM-DD` date (midnight UTC).
pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(raw.trim()).ok_or_else(|| D::Error::custom("must be a valid date"))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
